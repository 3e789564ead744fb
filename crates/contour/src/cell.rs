//! Single-cell marching squares.
//!
//! Corners are named by their offset from the cell origin: `v00` at (0, 0),
//! `v10` at (1, 0), `v01` at (0, 1), `v11` at (1, 1). A corner is "inside"
//! when its value is at least the iso-value. Crossings are computed in
//! cell-local coordinates, [0, 1] on both axes.

use std::fmt;
use std::str::FromStr;

use flowvis_core::VisError;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Denominators of the asymptote below this fall back to the corner mean.
pub const ASYMPTOTE_EPS: f64 = 1e-12;

/// Rule for pairing the four crossings of a saddle cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decider {
    /// Compare the mean of the four corners against the iso-value.
    #[default]
    Midpoint,
    /// Compare the value at the bilinear saddle point against the iso-value.
    Asymptotic,
}

impl Decider {
    pub fn as_str(self) -> &'static str {
        match self {
            Decider::Midpoint => "midpoint",
            Decider::Asymptotic => "asymptotic",
        }
    }
}

impl fmt::Display for Decider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decider {
    type Err = VisError;

    fn from_str(s: &str) -> Result<Self, VisError> {
        match s {
            "midpoint" => Ok(Decider::Midpoint),
            "asymptotic" => Ok(Decider::Asymptotic),
            other => Err(VisError::invalid_param(
                "decider",
                format!("expected 'midpoint' or 'asymptotic', got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// `v00`-`v10`, y = 0.
    Bottom,
    /// `v10`-`v11`, x = 1.
    Right,
    /// `v01`-`v11`, y = 1.
    Top,
    /// `v00`-`v01`, x = 0.
    Left,
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Applies `f` to both endpoints.
    pub fn map(self, f: impl Fn(DVec2) -> DVec2) -> Self {
        Self::new(f(self.start), f(self.end))
    }
}

/// The edge pairs a cell contributes: none, one, or two for a saddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePairs {
    pairs: [(Edge, Edge); 2],
    len: usize,
}

impl EdgePairs {
    const EMPTY: Self = Self {
        pairs: [(Edge::Bottom, Edge::Bottom); 2],
        len: 0,
    };

    fn one(a: Edge, b: Edge) -> Self {
        Self {
            pairs: [(a, b), (a, b)],
            len: 1,
        }
    }

    fn two(first: (Edge, Edge), second: (Edge, Edge)) -> Self {
        Self {
            pairs: [first, second],
            len: 2,
        }
    }

    pub fn as_slice(&self) -> &[(Edge, Edge)] {
        &self.pairs[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Corner values of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub v00: f64,
    pub v10: f64,
    pub v01: f64,
    pub v11: f64,
}

impl Cell {
    pub fn new(v00: f64, v10: f64, v01: f64, v11: f64) -> Self {
        Self { v00, v10, v01, v11 }
    }

    /// A cell is crossed when `max >= c` and `min < c`.
    pub fn is_crossed(&self, c: f64) -> bool {
        let min = self.v00.min(self.v10).min(self.v01).min(self.v11);
        let max = self.v00.max(self.v10).max(self.v01).max(self.v11);
        max >= c && min < c
    }

    pub fn mean(&self) -> f64 {
        (self.v00 + self.v10 + self.v01 + self.v11) / 4.0
    }

    /// Value of the bilinear interpolant at its saddle point.
    pub fn asymptote(&self) -> f64 {
        let denom = self.v00 + self.v11 - self.v10 - self.v01;
        if denom.abs() < ASYMPTOTE_EPS {
            return self.mean();
        }
        (self.v00 * self.v11 - self.v10 * self.v01) / denom
    }

    fn decide(&self, decider: Decider) -> f64 {
        match decider {
            Decider::Midpoint => self.mean(),
            Decider::Asymptotic => self.asymptote(),
        }
    }

    /// Classifies the cell against `c` and pairs up the crossed edges.
    ///
    /// Non-saddle cells cross exactly two edges and yield one pair. In a
    /// saddle (diagonal corners agree, adjacent corners differ) all four
    /// edges are crossed: if the decider's center value is on the same side
    /// as `v00`, the inside corners are joined through the center and the
    /// pairs are (Bottom, Right) and (Top, Left); otherwise they are
    /// (Bottom, Left) and (Top, Right).
    pub fn edge_pairs(&self, c: f64, decider: Decider) -> EdgePairs {
        if !self.is_crossed(c) {
            return EdgePairs::EMPTY;
        }
        let a = self.v00 >= c;
        let b = self.v10 >= c;
        let d = self.v01 >= c;
        let e = self.v11 >= c;

        if a == e && b == d && a != b {
            let center_inside = self.decide(decider) >= c;
            return if center_inside == a {
                EdgePairs::two((Edge::Bottom, Edge::Right), (Edge::Top, Edge::Left))
            } else {
                EdgePairs::two((Edge::Bottom, Edge::Left), (Edge::Top, Edge::Right))
            };
        }

        let mut crossed = [Edge::Bottom, Edge::Top, Edge::Left, Edge::Right]
            .into_iter()
            .filter(|edge| match edge {
                Edge::Bottom => a != b,
                Edge::Right => b != e,
                Edge::Top => d != e,
                Edge::Left => a != d,
            });
        match (crossed.next(), crossed.next()) {
            (Some(first), Some(second)) => EdgePairs::one(first, second),
            _ => EdgePairs::EMPTY,
        }
    }

    /// Cell-local point where the iso-line crosses `edge`, by linear
    /// interpolation between the edge's corners.
    pub fn crossing(&self, edge: Edge, c: f64) -> DVec2 {
        let lerp = |from: f64, to: f64| {
            let span = to - from;
            if span == 0.0 {
                0.5
            } else {
                ((c - from) / span).clamp(0.0, 1.0)
            }
        };
        match edge {
            Edge::Bottom => DVec2::new(lerp(self.v00, self.v10), 0.0),
            Edge::Right => DVec2::new(1.0, lerp(self.v10, self.v11)),
            Edge::Top => DVec2::new(lerp(self.v01, self.v11), 1.0),
            Edge::Left => DVec2::new(0.0, lerp(self.v00, self.v01)),
        }
    }

    /// Segments in cell-local coordinates.
    pub fn segments(&self, c: f64, decider: Decider) -> impl Iterator<Item = Segment> + '_ {
        let pairs = self.edge_pairs(c, decider);
        (0..pairs.len()).map(move |k| {
            let (a, b) = pairs.as_slice()[k];
            Segment::new(self.crossing(a, c), self.crossing(b, c))
        })
    }
}

/// Segments of the cell with corners `v00, v10, v01, v11` at iso-value `c`,
/// in cell-local coordinates.
pub fn cell_segments(
    v00: f64,
    v10: f64,
    v01: f64,
    v11: f64,
    c: f64,
    decider: Decider,
) -> Vec<Segment> {
    Cell::new(v00, v10, v01, v11).segments(c, decider).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn single_corner_gives_one_segment_between_adjacent_midpoints() {
        let segs = cell_segments(0.0, 0.0, 0.0, 1.0, 0.5, Decider::Midpoint);
        assert_eq!(segs.len(), 1);
        assert!(approx(segs[0].start, DVec2::new(0.5, 1.0)));
        assert!(approx(segs[0].end, DVec2::new(1.0, 0.5)));
    }

    #[test]
    fn uniform_cells_emit_nothing() {
        assert!(cell_segments(1.0, 1.0, 1.0, 1.0, 0.5, Decider::Midpoint).is_empty());
        assert!(cell_segments(0.0, 0.0, 0.0, 0.0, 0.5, Decider::Midpoint).is_empty());
        // All corners equal to c count as inside; min < c fails.
        assert!(cell_segments(0.5, 0.5, 0.5, 0.5, 0.5, Decider::Midpoint).is_empty());
    }

    #[test]
    fn half_split_cells_cross_opposite_edges() {
        let cell = Cell::new(1.0, 1.0, 0.0, 0.0);
        assert_eq!(cell.edge_pairs(0.5, Decider::Midpoint).as_slice(), &[(Edge::Left, Edge::Right)]);
        let cell = Cell::new(1.0, 0.0, 1.0, 0.0);
        assert_eq!(cell.edge_pairs(0.5, Decider::Midpoint).as_slice(), &[(Edge::Bottom, Edge::Top)]);
    }

    #[test]
    fn every_non_saddle_crossing_case_has_one_segment() {
        for mask in 1_u8..15 {
            if mask == 0b1001 || mask == 0b0110 {
                continue;
            }
            let bit = |k: u8| if mask & (1 << k) != 0 { 1.0 } else { 0.0 };
            let cell = Cell::new(bit(0), bit(1), bit(2), bit(3));
            assert_eq!(cell.edge_pairs(0.5, Decider::Midpoint).len(), 1, "mask {mask:04b}");
        }
    }

    #[test]
    fn saddle_deciders_disagree() {
        // Mean 0.65 is above c; the saddle point (~0.4615) is below.
        let cell = Cell::new(2.0, 0.0, 0.0, 0.6);
        assert!((cell.mean() - 0.65).abs() < 1e-12);
        assert!((cell.asymptote() - 1.2 / 2.6).abs() < 1e-12);

        let mid = cell.edge_pairs(0.5, Decider::Midpoint);
        assert_eq!(mid.as_slice(), &[(Edge::Bottom, Edge::Right), (Edge::Top, Edge::Left)]);

        let asym = cell.edge_pairs(0.5, Decider::Asymptotic);
        assert_eq!(asym.as_slice(), &[(Edge::Bottom, Edge::Left), (Edge::Top, Edge::Right)]);
    }

    #[test]
    fn symmetric_saddle_deciders_agree() {
        let cell = Cell::new(1.0, 0.0, 0.0, 1.0);
        let mid = cell.edge_pairs(0.5, Decider::Midpoint);
        let asym = cell.edge_pairs(0.5, Decider::Asymptotic);
        assert_eq!(mid.len(), 2);
        assert_eq!(mid, asym);
        let segs: Vec<Segment> = cell.segments(0.5, Decider::Midpoint).collect();
        assert!(approx(segs[0].start, DVec2::new(0.5, 0.0)));
        assert!(approx(segs[0].end, DVec2::new(1.0, 0.5)));
    }

    #[test]
    fn asymptote_falls_back_to_mean() {
        let cell = Cell::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(cell.asymptote(), cell.mean());
    }

    #[test]
    fn crossing_interpolates_linearly() {
        let cell = Cell::new(0.0, 4.0, 0.0, 0.0);
        assert!(approx(cell.crossing(Edge::Bottom, 1.0), DVec2::new(0.25, 0.0)));
    }

    #[test]
    fn decider_parses_from_name() {
        assert_eq!("asymptotic".parse::<Decider>().unwrap(), Decider::Asymptotic);
        assert!("nearest".parse::<Decider>().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn crossings_lie_on_cell_boundary(
                v in proptest::array::uniform4(-10.0_f64..10.0),
                c in -10.0_f64..10.0,
            ) {
                let cell = Cell::new(v[0], v[1], v[2], v[3]);
                for decider in [Decider::Midpoint, Decider::Asymptotic] {
                    for seg in cell.segments(c, decider) {
                        for p in [seg.start, seg.end] {
                            prop_assert!((0.0..=1.0).contains(&p.x));
                            prop_assert!((0.0..=1.0).contains(&p.y));
                            prop_assert!(p.x == 0.0 || p.x == 1.0 || p.y == 0.0 || p.y == 1.0);
                        }
                    }
                }
            }

            #[test]
            fn crossed_cells_emit_one_or_two_segments(
                v in proptest::array::uniform4(-10.0_f64..10.0),
                c in -10.0_f64..10.0,
            ) {
                let cell = Cell::new(v[0], v[1], v[2], v[3]);
                let n = cell.edge_pairs(c, Decider::Midpoint).len();
                if cell.is_crossed(c) {
                    prop_assert!(n == 1 || n == 2);
                } else {
                    prop_assert_eq!(n, 0);
                }
            }
        }
    }
}
