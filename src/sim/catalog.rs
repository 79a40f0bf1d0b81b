/// Level catalog.
///
/// ## Sources (priority order):
///   1. `general.levels_file` from config.toml (XSB pack)
///   2. Built-in stages (ten bordered grids of increasing size)
///
/// A pack that is missing, unreadable or malformed is logged and the
/// built-in stages are used instead.
///
/// ## Pack format (XSB):
///   ```
///   ; Stage 1
///   #####
///   #@$.#
///   #####
///
///   ; Stage 2
///   ...
///   ```
///
/// Levels are separated by blank lines or `;` comment lines.
/// Tile legend: see `domain::level`.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::entity::Position;
use crate::domain::level::Level;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid level {index}: {reason}")]
    InvalidLevel { index: usize, reason: String },
    #[error("pack contains no levels")]
    Empty,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Levels for this run, according to config.
pub fn load_catalog(config: &GameConfig) -> Vec<Level> {
    let path = match &config.levels_file {
        Some(p) => p,
        None => return builtin_levels(),
    };

    match load_pack(path) {
        Ok(levels) => {
            tracing::info!(path = %path.display(), count = levels.len(), "loaded level pack");
            levels
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "level pack unusable, using built-in stages");
            builtin_levels()
        }
    }
}

/// Read and parse an XSB pack file.
pub fn load_pack(path: &Path) -> Result<Vec<Level>, LevelError> {
    let content = fs::read_to_string(path)?;
    parse_pack(&content)
}

/// Parse every level of an XSB pack.
pub fn parse_pack(content: &str) -> Result<Vec<Level>, LevelError> {
    let mut levels = vec![];
    let mut current = String::new();

    for line in content.lines() {
        let separator = line.trim().is_empty() || line.trim_start().starts_with(';');
        if separator {
            flush_level(&mut current, &mut levels)?;
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    flush_level(&mut current, &mut levels)?;

    if levels.is_empty() {
        return Err(LevelError::Empty);
    }
    Ok(levels)
}

fn flush_level(current: &mut String, levels: &mut Vec<Level>) -> Result<(), LevelError> {
    if current.is_empty() {
        return Ok(());
    }
    let index = levels.len() + 1;
    let level = Level::from_text(current.trim_end())
        .map_err(|reason| LevelError::InvalidLevel { index, reason })?;
    if level.boxes.is_empty() {
        return Err(LevelError::InvalidLevel { index, reason: "level has no boxes".to_string() });
    }
    levels.push(level);
    current.clear();
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Built-in stages
// ══════════════════════════════════════════════════════════════

/// The ten built-in stages. Every stage is a bordered square with the
/// player starting at (1, 1).
pub fn builtin_levels() -> Vec<Level> {
    vec![
        stage(10)
            .with_boxes(&[(2, 2)])
            .with_goals(&[(8, 8)]),
        stage(10)
            .with_walls(&[(4, 4), (5, 4), (6, 4)])
            .with_boxes(&[(2, 2), (3, 2)])
            .with_goals(&[(7, 7), (8, 8)]),
        stage(10)
            .with_walls(&[
                (3, 3), (4, 3), (5, 3), (6, 3),
                (3, 6), (4, 6), (5, 6), (6, 6),
            ])
            .with_boxes(&[(2, 2), (2, 3), (2, 4)])
            .with_goals(&[(7, 6), (7, 7), (7, 8)]),
        stage(10)
            .with_walls(&[
                (4, 2), (4, 3), (4, 4),
                (5, 2), (5, 3), (5, 4),
                (7, 2), (7, 3), (7, 4),
                (7, 6), (7, 7),
                (2, 7), (3, 7), (4, 7),
            ])
            .with_boxes(&[(2, 2), (2, 3), (2, 4), (3, 2)])
            .with_goals(&[(6, 2), (6, 3), (6, 4), (8, 8)]),
        stage(12)
            .with_walls(&[
                (5, 2), (5, 3), (5, 4),
                (6, 2), (6, 3), (6, 4),
                (8, 2), (8, 3), (8, 4),
                (8, 6), (8, 7),
                (2, 8), (3, 8),
            ])
            .with_boxes(&[(2, 2), (2, 3), (2, 4), (3, 2)])
            .with_goals(&[(7, 2), (7, 3), (7, 4), (9, 9)]),
        stage(14)
            .with_walls(&[
                (6, 2), (6, 3), (6, 4), (6, 5), (6, 6),
                (7, 2), (7, 3), (7, 4), (7, 5), (7, 6),
                (9, 2), (9, 3), (9, 4),
                (9, 6), (9, 7), (9, 8), (9, 9),
                (2, 9), (3, 9), (4, 9),
                (3, 4), (3, 5),
                (11, 4), (11, 5),
            ])
            .with_boxes(&[(2, 2), (2, 3), (2, 4), (3, 2), (4, 2), (5, 2)])
            .with_goals(&[(8, 2), (8, 3), (8, 4), (10, 10), (11, 11), (12, 12)]),
        stage(16)
            .with_walls(&[
                (7, 2), (7, 3), (7, 4), (7, 5), (7, 6), (7, 7),
                (8, 2), (8, 3), (8, 4), (8, 5), (8, 6), (8, 7),
                (10, 2), (10, 3), (10, 4),
                (10, 6), (10, 7), (10, 8), (10, 9), (10, 10),
                (2, 10), (3, 10), (4, 10),
                (3, 4), (3, 5),
                (12, 4), (12, 5),
                (5, 8), (5, 9),
            ])
            .with_boxes(&[(2, 2), (2, 3), (2, 4), (3, 2), (4, 2), (5, 2), (6, 2)])
            .with_goals(&[
                (9, 2), (9, 3), (9, 4),
                (11, 11), (12, 12), (13, 13), (14, 14),
            ]),
        stage(18)
            .with_walls(&[
                (8, 2), (8, 3), (8, 4), (8, 5), (8, 6), (8, 7), (8, 8),
                (9, 2), (9, 3), (9, 4), (9, 5), (9, 6), (9, 7), (9, 8),
                (11, 2), (11, 3), (11, 4),
                (11, 6), (11, 7), (11, 8), (11, 9), (11, 10), (11, 11),
                (2, 11), (3, 11), (4, 11),
                (3, 4), (3, 5),
                (13, 4), (13, 5),
                (5, 9), (5, 10),
                (14, 7), (14, 8),
            ])
            .with_boxes(&[(2, 2), (2, 3), (2, 4), (3, 2), (4, 2), (5, 2), (6, 2), (7, 2)])
            .with_goals(&[
                (10, 2), (10, 3), (10, 4),
                (12, 12), (13, 13), (14, 14), (15, 15), (16, 16),
            ]),
        stage(20)
            .with_walls(&[
                (9, 2), (9, 3), (9, 4), (9, 5), (9, 6), (9, 7), (9, 8), (9, 9),
                (10, 2), (10, 3), (10, 4), (10, 5), (10, 6), (10, 7), (10, 8), (10, 9),
                (12, 2), (12, 3), (12, 4),
                (12, 6), (12, 7), (12, 8), (12, 9), (12, 10), (12, 11), (12, 12),
                (2, 12), (3, 12), (4, 12),
                (3, 4), (3, 5),
                (14, 4), (14, 5),
                (5, 10), (5, 11),
                (15, 7), (15, 8),
                (7, 13), (7, 14),
            ])
            .with_boxes(&[
                (2, 2), (2, 3), (2, 4), (3, 2), (4, 2), (5, 2), (6, 2), (7, 2), (8, 2),
            ])
            .with_goals(&[
                (11, 2), (11, 3), (11, 4),
                (13, 13), (14, 14), (15, 15), (16, 16), (17, 17), (18, 18),
            ]),
        stage(22)
            .with_walls(&[
                (10, 2), (10, 3), (10, 4), (10, 5), (10, 6), (10, 7), (10, 8), (10, 9), (10, 10),
                (11, 2), (11, 3), (11, 4), (11, 5), (11, 6), (11, 7), (11, 8), (11, 9), (11, 10),
                (13, 2), (13, 3), (13, 4),
                (13, 6), (13, 7), (13, 8), (13, 9), (13, 10), (13, 11), (13, 12), (13, 13),
                (2, 13), (3, 13), (4, 13),
                (3, 4), (3, 5),
                (15, 4), (15, 5),
                (5, 11), (5, 12),
                (16, 7), (16, 8),
                (7, 14), (7, 15),
                (17, 10), (17, 11),
            ])
            .with_boxes(&[
                (2, 2), (2, 3), (2, 4), (3, 2), (4, 2), (5, 2), (6, 2), (7, 2), (8, 2), (9, 2),
            ])
            .with_goals(&[
                (12, 2), (12, 3), (12, 4),
                (14, 14), (15, 15), (16, 16), (17, 17), (18, 18), (19, 19), (20, 20),
            ]),
    ]
}

fn stage(size: usize) -> Level {
    Level::new(size, size, Position::new(1, 1)).with_border()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules;

    #[test]
    fn ten_builtin_stages() {
        let levels = builtin_levels();
        assert_eq!(levels.len(), 10);
        let sizes: Vec<usize> = levels.iter().map(|l| l.width).collect();
        assert_eq!(sizes, vec![10, 10, 10, 10, 12, 14, 16, 18, 20, 22]);
        let boxes: Vec<usize> = levels.iter().map(|l| l.boxes.len()).collect();
        assert_eq!(boxes, vec![1, 2, 3, 4, 4, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn stage_one_layout() {
        let l = &builtin_levels()[0];
        assert_eq!((l.width, l.height), (10, 10));
        assert_eq!(l.player, Position::new(1, 1));
        assert_eq!(l.boxes, vec![Position::new(2, 2)]);
        assert!(l.is_goal(Position::new(8, 8)));
        assert_eq!(l.goals.len(), 1);
    }

    #[test]
    fn builtin_stages_respect_authoring_invariants() {
        for (i, l) in builtin_levels().iter().enumerate() {
            let stage = i + 1;
            assert_eq!(l.width, l.height, "stage {stage} not square");
            assert!(l.goals.len() >= l.boxes.len(), "stage {stage} lacks goals");
            assert!(!rules::is_wall(l, l.player), "stage {stage}: player in wall");
            for b in &l.boxes {
                assert!(l.contains(*b), "stage {stage}: box {b} off grid");
                assert!(!rules::is_wall(l, *b), "stage {stage}: box {b} in wall");
            }
            for g in &l.goals {
                assert!(!rules::is_wall(l, *g), "stage {stage}: goal {g} in wall");
            }
            for w in &l.walls {
                assert!(l.contains(*w), "stage {stage}: wall {w} off grid");
            }
            assert!(!rules::check_win(l), "stage {stage} starts solved");
        }
    }

    #[test]
    fn parse_pack_with_comments_and_blank_lines() {
        let pack = "; 1\n\n#####\n#@$.#\n#####\n\n; 2\n######\n#@ $.#\n######\n";
        let levels = parse_pack(pack).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].width, 6);
        assert_eq!(levels[1].boxes, vec![Position::new(3, 1)]);
    }

    #[test]
    fn parse_pack_reports_bad_level_index() {
        let pack = "#####\n#@$.#\n#####\n\n#####\n#@@.#\n#####\n";
        match parse_pack(pack) {
            Err(LevelError::InvalidLevel { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected InvalidLevel, got {other:?}"),
        }
    }

    #[test]
    fn parse_pack_rejects_boxless_level() {
        let pack = "####\n#@.#\n####\n";
        assert!(matches!(parse_pack(pack), Err(LevelError::InvalidLevel { index: 1, .. })));
    }

    #[test]
    fn parse_pack_rejects_empty_input() {
        assert!(matches!(parse_pack("; nothing here\n\n"), Err(LevelError::Empty)));
    }

    #[test]
    fn missing_pack_is_io_error() {
        let result = load_pack(Path::new("no_such_pack.xsb"));
        assert!(matches!(result, Err(LevelError::Io(_))));
    }

    #[test]
    fn catalog_falls_back_to_builtin() {
        let mut config = GameConfig::default();
        config.levels_file = Some("no_such_pack.xsb".into());
        assert_eq!(load_catalog(&config), builtin_levels());
    }

    #[test]
    fn bundled_sample_pack_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("packs/sample.xsb");
        let mut config = GameConfig::default();
        config.levels_file = Some(path.clone());

        let levels = load_pack(&path).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].boxes.len(), levels[1].goals.len());
        assert_eq!(load_catalog(&config), levels);
    }
}
