//! Iso-level selection and colored isolines.

use flowvis_core::{ScalarField, TransferFunction, VisError};
use glam::DVec4;
use tracing::info;

use crate::cell::{Decider, Segment};
use crate::extract::{compare_deciders, extract};

pub const MAX_CONTOURS: usize = 50;

/// Default isoline color: opaque blue.
pub const DEFAULT_ISO_COLOR: DVec4 = DVec4::new(0.0, 0.0, 1.0, 1.0);

/// Which iso-values to extract and how to color them.
#[derive(Debug, Clone, PartialEq)]
pub enum IsoLevels {
    /// One isoline at `value`.
    Single { value: f64, color: DVec4 },
    /// `count` evenly spaced values strictly between the field's min and
    /// max, colored by sampling `transfer` at each value's normalized
    /// position in that range.
    Uniform {
        count: usize,
        transfer: TransferFunction,
    },
}

impl IsoLevels {
    pub fn single(value: f64) -> Self {
        IsoLevels::Single {
            value,
            color: DEFAULT_ISO_COLOR,
        }
    }

    pub fn uniform(count: usize, transfer: TransferFunction) -> Self {
        IsoLevels::Uniform { count, transfer }
    }
}

/// Evenly spaced values `min + k (max - min) / (count + 1)`, `k = 1..=count`.
pub fn iso_values(min: f64, max: f64, count: usize) -> Vec<f64> {
    let spacing = (max - min) / (count + 1) as f64;
    (1..=count).map(|k| min + spacing * k as f64).collect()
}

/// One iso-value's segments with its color.
#[derive(Debug, Clone, PartialEq)]
pub struct Isoline {
    pub value: f64,
    pub color: DVec4,
    pub segments: Vec<Segment>,
}

/// Resolves `levels` against `field` into `(value, color)` pairs.
pub fn resolve_levels(
    field: &ScalarField,
    levels: &IsoLevels,
) -> Result<Vec<(f64, DVec4)>, VisError> {
    match levels {
        IsoLevels::Single { value, color } => Ok(vec![(*value, *color)]),
        IsoLevels::Uniform { count, transfer } => {
            if !(1..=MAX_CONTOURS).contains(count) {
                return Err(VisError::invalid_param(
                    "contours",
                    format!("must lie in [1, {MAX_CONTOURS}], got {count}"),
                ));
            }
            let Some((min, max)) = field.value_range() else {
                return Err(VisError::invalid_param(
                    "contours",
                    "field has no finite values",
                ));
            };
            let span = max - min;
            Ok(iso_values(min, max, *count)
                .into_iter()
                .map(|v| {
                    let t = if span > 0.0 { (v - min) / span } else { 0.0 };
                    (v, transfer.sample(t))
                })
                .collect())
        }
    }
}

/// Extracts every isoline `levels` asks for.
pub fn contour(
    field: &ScalarField,
    levels: &IsoLevels,
    decider: Decider,
) -> Result<Vec<Isoline>, VisError> {
    let lines = resolve_levels(field, levels)?
        .into_iter()
        .map(|(value, color)| {
            Ok(Isoline {
                value,
                color,
                segments: extract(field, value, decider)?,
            })
        })
        .collect::<Result<Vec<_>, VisError>>()?;
    info!(
        levels = lines.len(),
        segments = lines.iter().map(|l| l.segments.len()).sum::<usize>(),
        decider = decider.as_str(),
        "contoured"
    );
    Ok(lines)
}

/// Extracts every level with both deciders: the midpoint isoline in the
/// level's color followed by the asymptotic one in `asymptotic_color`.
pub fn contour_both_deciders(
    field: &ScalarField,
    levels: &IsoLevels,
    asymptotic_color: DVec4,
) -> Result<Vec<Isoline>, VisError> {
    let mut lines = Vec::new();
    let mut disagreements = 0;
    for (value, color) in resolve_levels(field, levels)? {
        let cmp = compare_deciders(field, value)?;
        disagreements += usize::from(!cmp.agree());
        lines.push(Isoline {
            value,
            color,
            segments: cmp.midpoint,
        });
        lines.push(Isoline {
            value,
            color: asymptotic_color,
            segments: cmp.asymptotic,
        });
    }
    info!(
        levels = lines.len() / 2,
        disagreements,
        "contoured with both deciders"
    );
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ScalarField {
        ScalarField::from_fn(5, 5, |x, _| x as f64).unwrap()
    }

    #[test]
    fn one_contour_sits_halfway() {
        assert_eq!(iso_values(0.0, 10.0, 1), vec![5.0]);
        assert_eq!(iso_values(0.0, 4.0, 3), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn single_level_uses_given_color() {
        let color = DVec4::new(1.0, 0.0, 0.0, 1.0);
        let lines = contour(
            &ramp(),
            &IsoLevels::Single { value: 2.5, color },
            Decider::Midpoint,
        )
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].color, color);
        // Vertical line crossing all 4 rows of cells.
        assert_eq!(lines[0].segments.len(), 4);
    }

    #[test]
    fn uniform_levels_sample_transfer_function() {
        let levels = IsoLevels::uniform(3, TransferFunction::grayscale());
        let lines = contour(&ramp(), &levels, Decider::Asymptotic).unwrap();
        let values: Vec<f64> = lines.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        for line in &lines {
            let expected = TransferFunction::grayscale().sample(line.value / 4.0);
            assert_eq!(line.color, expected);
        }
        assert!(lines[0].color.x < lines[2].color.x);
    }

    #[test]
    fn contour_count_is_bounded() {
        let field = ramp();
        assert!(contour(&field, &IsoLevels::uniform(0, TransferFunction::default()), Decider::Midpoint).is_err());
        assert!(contour(&field, &IsoLevels::uniform(51, TransferFunction::default()), Decider::Midpoint).is_err());
    }

    #[test]
    fn flat_field_yields_empty_isolines() {
        let field = ScalarField::filled(4, 4, 2.0).unwrap();
        let lines = contour(&field, &IsoLevels::uniform(2, TransferFunction::default()), Decider::Midpoint)
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.segments.is_empty()));
    }

    #[test]
    fn both_deciders_pair_up_per_level() {
        // Saddle cell: corners 2, 0, 0, 0.6 split differently at 0.5.
        let field = ScalarField::from_data(2, 2, vec![2.0, 0.0, 0.0, 0.6]).unwrap();
        let red = DVec4::new(1.0, 0.0, 0.0, 1.0);
        let lines = contour_both_deciders(&field, &IsoLevels::single(0.5), red).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].color, DEFAULT_ISO_COLOR);
        assert_eq!(lines[1].color, red);
        assert_eq!(lines[0].segments, extract(&field, 0.5, Decider::Midpoint).unwrap());
        assert_eq!(lines[1].segments, extract(&field, 0.5, Decider::Asymptotic).unwrap());
        assert_ne!(lines[0].segments, lines[1].segments);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn iso_values_are_strictly_inside_range(
                min in -100.0_f64..100.0,
                span in 0.1_f64..100.0,
                count in 1_usize..50,
            ) {
                let max = min + span;
                let values = iso_values(min, max, count);
                prop_assert_eq!(values.len(), count);
                prop_assert!(values.iter().all(|&v| v > min && v < max));
                prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
