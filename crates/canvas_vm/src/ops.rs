//! Color recognition and the hue/lightness-delta → opcode mapping.

use serde::{Deserialize, Serialize};

/// The 21 colors a codel can carry: 18 chromatic (6 hues × 3 lightnesses),
/// White, Black, and Unrecognized (any RGB outside the palette).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Col {
    LightRed,
    Red,
    DarkRed,
    LightYellow,
    Yellow,
    DarkYellow,
    LightGreen,
    Green,
    DarkGreen,
    LightCyan,
    Cyan,
    DarkCyan,
    LightBlue,
    Blue,
    DarkBlue,
    LightMagenta,
    Magenta,
    DarkMagenta,
    White,
    Black,
    Unrecognized,
}

impl Col {
    /// Exact-match lookup against the 20-entry palette. Anything else is
    /// `Unrecognized` rather than an error: it still becomes its own shape
    /// during tokenization, it just behaves as an obstacle at
    /// move time (see `navigator`).
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Col {
        match (r, g, b) {
            (0xFF, 0xC0, 0xC0) => Col::LightRed,
            (0xFF, 0x00, 0x00) => Col::Red,
            (0xC0, 0x00, 0x00) => Col::DarkRed,

            (0xFF, 0xFF, 0xC0) => Col::LightYellow,
            (0xFF, 0xFF, 0x00) => Col::Yellow,
            (0xC0, 0xC0, 0x00) => Col::DarkYellow,

            (0xC0, 0xFF, 0xC0) => Col::LightGreen,
            (0x00, 0xFF, 0x00) => Col::Green,
            (0x00, 0xC0, 0x00) => Col::DarkGreen,

            (0xC0, 0xFF, 0xFF) => Col::LightCyan,
            (0x00, 0xFF, 0xFF) => Col::Cyan,
            (0x00, 0xC0, 0xC0) => Col::DarkCyan,

            (0xC0, 0xC0, 0xFF) => Col::LightBlue,
            (0x00, 0x00, 0xFF) => Col::Blue,
            (0x00, 0x00, 0xC0) => Col::DarkBlue,

            (0xFF, 0xC0, 0xFF) => Col::LightMagenta,
            (0xFF, 0x00, 0xFF) => Col::Magenta,
            (0xC0, 0x00, 0xC0) => Col::DarkMagenta,

            (0xFF, 0xFF, 0xFF) => Col::White,
            (0x00, 0x00, 0x00) => Col::Black,

            _ => Col::Unrecognized,
        }
    }

    /// 0..=5, hue order Red/Yellow/Green/Cyan/Blue/Magenta. `None` for the
    /// non-chromatic colors.
    pub fn hue(&self) -> Option<u8> {
        match self {
            Col::LightRed | Col::Red | Col::DarkRed => Some(0),
            Col::LightYellow | Col::Yellow | Col::DarkYellow => Some(1),
            Col::LightGreen | Col::Green | Col::DarkGreen => Some(2),
            Col::LightCyan | Col::Cyan | Col::DarkCyan => Some(3),
            Col::LightBlue | Col::Blue | Col::DarkBlue => Some(4),
            Col::LightMagenta | Col::Magenta | Col::DarkMagenta => Some(5),
            Col::White | Col::Black | Col::Unrecognized => None,
        }
    }

    /// 0=light, 1=medium, 2=dark. `None` for the non-chromatic colors.
    pub fn lightness(&self) -> Option<u8> {
        match self {
            Col::LightRed
            | Col::LightYellow
            | Col::LightGreen
            | Col::LightCyan
            | Col::LightBlue
            | Col::LightMagenta => Some(0),

            Col::Red | Col::Yellow | Col::Green | Col::Cyan | Col::Blue | Col::Magenta => Some(1),

            Col::DarkRed
            | Col::DarkYellow
            | Col::DarkGreen
            | Col::DarkCyan
            | Col::DarkBlue
            | Col::DarkMagenta => Some(2),

            Col::White | Col::Black | Col::Unrecognized => None,
        }
    }

    pub fn is_white(&self) -> bool {
        matches!(self, Col::White)
    }

    pub fn is_black(&self) -> bool {
        matches!(self, Col::Black)
    }

    /// Unrecognized codels are obstacles for navigation purposes, same as Black.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Col::Unrecognized)
    }

    /// Black and Unrecognized both block the Navigator.
    pub fn is_obstacle(&self) -> bool {
        self.is_black() || self.is_unrecognized()
    }
}

/// The 18 Piet operations plus Noop and Exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Push,
    Pop,
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Not,
    Greater,
    Pointer,
    Switch,
    Dup,
    Roll,
    NumIn,
    CharIn,
    NumOut,
    CharOut,
    Noop,
    Exit,
}

/// Maps a hue/lightness transition between two chromatic codels to an
/// opcode. White/Black/Unrecognized source or destination always yields
/// Noop; the caller never emits Noop as a real instruction (shape
/// boundaries never occur between same-color codels).
pub fn op_from_transition(src: Col, dst: Col) -> Op {
    if src.is_white() || src.is_black() || src.is_unrecognized() {
        return Op::Noop;
    }
    if dst.is_white() || dst.is_black() || dst.is_unrecognized() {
        return Op::Noop;
    }

    let src_hue = src.hue().expect("chromatic color has a hue") as i32;
    let dst_hue = dst.hue().expect("chromatic color has a hue") as i32;
    let src_light = src.lightness().expect("chromatic color has a lightness") as i32;
    let dst_light = dst.lightness().expect("chromatic color has a lightness") as i32;

    let hue_diff = (dst_hue - src_hue).rem_euclid(6) as u8;
    let light_diff = (dst_light - src_light).rem_euclid(3) as u8;

    match (hue_diff, light_diff) {
        (0, 0) => Op::Noop,
        (1, 0) => Op::Push,
        (2, 0) => Op::Pop,
        (3, 0) => Op::Add,
        (4, 0) => Op::Sub,
        (5, 0) => Op::Mult,
        (0, 1) => Op::Div,
        (1, 1) => Op::Mod,
        (2, 1) => Op::Not,
        (3, 1) => Op::Greater,
        (4, 1) => Op::Pointer,
        (5, 1) => Op::Switch,
        (0, 2) => Op::Dup,
        (1, 2) => Op::Roll,
        (2, 2) => Op::NumIn,
        (3, 2) => Op::CharIn,
        (4, 2) => Op::NumOut,
        (5, 2) => Op::CharOut,
        _ => unreachable!("hue_diff in 0..6, light_diff in 0..3"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_matches_the_palette() {
        assert_eq!(Col::from_rgb(0xFF, 0x00, 0x00), Col::Red);
        assert_eq!(Col::from_rgb(0xFF, 0xFF, 0x00), Col::Yellow);
        assert_eq!(Col::from_rgb(0x00, 0x00, 0xFF), Col::Blue);
        assert_eq!(Col::from_rgb(0xFF, 0xFF, 0xFF), Col::White);
        assert_eq!(Col::from_rgb(0x00, 0x00, 0x00), Col::Black);
    }

    #[test]
    fn off_palette_rgb_is_unrecognized() {
        assert_eq!(Col::from_rgb(12, 34, 56), Col::Unrecognized);
    }

    #[test]
    fn hue_and_lightness() {
        assert_eq!(Col::Red.hue(), Some(0));
        assert_eq!(Col::LightRed.lightness(), Some(0));
        assert_eq!(Col::Red.lightness(), Some(1));
        assert_eq!(Col::DarkRed.lightness(), Some(2));
        assert_eq!(Col::White.hue(), None);
        assert_eq!(Col::Unrecognized.hue(), None);
    }

    #[test]
    fn op_from_transition_matches_the_official_table() {
        assert_eq!(op_from_transition(Col::Red, Col::Red), Op::Noop);
        assert_eq!(op_from_transition(Col::LightRed, Col::Red), Op::Push);
        assert_eq!(op_from_transition(Col::LightRed, Col::DarkRed), Op::Pop);
        assert_eq!(op_from_transition(Col::Red, Col::Yellow), Op::Add);
        assert_eq!(op_from_transition(Col::DarkMagenta, Col::DarkRed), Op::Div);
        assert_eq!(op_from_transition(Col::LightRed, Col::LightMagenta), Op::Mult);
        assert_eq!(op_from_transition(Col::DarkMagenta, Col::DarkMagenta), Op::Noop);
    }

    #[test]
    fn op_from_transition_is_noop_through_black_or_white() {
        assert_eq!(op_from_transition(Col::Red, Col::Black), Op::Noop);
        assert_eq!(op_from_transition(Col::White, Col::Red), Op::Noop);
        assert_eq!(op_from_transition(Col::Red, Col::Unrecognized), Op::Noop);
    }

    #[test]
    fn every_hue_light_pair_has_exactly_one_op() {
        use std::collections::HashSet;
        let chromatic = [
            Col::LightRed, Col::Red, Col::DarkRed,
            Col::LightYellow, Col::Yellow, Col::DarkYellow,
            Col::LightGreen, Col::Green, Col::DarkGreen,
            Col::LightCyan, Col::Cyan, Col::DarkCyan,
            Col::LightBlue, Col::Blue, Col::DarkBlue,
            Col::LightMagenta, Col::Magenta, Col::DarkMagenta,
        ];
        let mut seen_pairs: HashSet<(u8, u8)> = HashSet::new();
        for &a in &chromatic {
            for &b in &chromatic {
                if a == b {
                    continue;
                }
                let hue_diff = (b.hue().unwrap() as i32 - a.hue().unwrap() as i32).rem_euclid(6) as u8;
                let light_diff = (b.lightness().unwrap() as i32 - a.lightness().unwrap() as i32).rem_euclid(3) as u8;
                if hue_diff == 0 && light_diff == 0 {
                    continue;
                }
                seen_pairs.insert((hue_diff, light_diff));
            }
        }
        // all 17 non-identity (hue, light) pairs are reachable
        assert_eq!(seen_pairs.len(), 17);
    }
}
