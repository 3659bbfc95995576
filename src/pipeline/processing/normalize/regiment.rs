use serde_json::Value;

use crate::constants::{NORTH_STAFFORDSHIRE, OTHER_REGIMENT, ROYAL_ARTILLERY, SOUTH_STAFFORDSHIRE};

/// Which way a regiment name points, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    North,
    South,
}

/// True when `lowered` names the direction either spelled out ("north",
/// anywhere) or as an initial ("n", "n.") directly in front of a "staff..."
/// word, as in "N Staffs" or "1/S. Staffords".
fn mentions(lowered: &str, direction: Direction) -> bool {
    let (word, initial) = match direction {
        Direction::North => ("north", "n"),
        Direction::South => ("south", "s"),
    };
    if lowered.contains(word) {
        return true;
    }
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();
    tokens
        .windows(2)
        .any(|pair| pair[0] == initial && pair[1].starts_with("staff"))
}

/// Map a free-text regiment name to its canonical label.
///
/// Rules are checked in order and the first match wins, so a name mentioning
/// both a Staffordshire direction and artillery resolves to the Staffordshire
/// regiment. Unmatched strings are returned with their original casing;
/// anything that is not a string becomes "Other".
pub fn normalize_regiment(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::String(s)) => s,
        _ => return OTHER_REGIMENT.to_string(),
    };
    let lowered = raw.to_lowercase();
    let staff = lowered.contains("staff");

    if staff && mentions(&lowered, Direction::North) {
        NORTH_STAFFORDSHIRE.to_string()
    } else if staff && mentions(&lowered, Direction::South) {
        SOUTH_STAFFORDSHIRE.to_string()
    } else if lowered.contains("artillery") {
        ROYAL_ARTILLERY.to_string()
    } else {
        raw.clone()
    }
}
