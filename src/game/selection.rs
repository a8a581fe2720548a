use rand::rngs::SmallRng;
use rand::Rng;

use super::error::RuntimeError;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for SmallRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

pub struct FnRandom<F>(pub F);

impl<F: FnMut() -> f64> RandomSource for FnRandom<F> {
    fn next_unit(&mut self) -> f64 {
        (self.0)()
    }
}

pub trait Weighted {
    fn weight(&self) -> f64;
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> f64 {
        (**self).weight()
    }
}

fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Returns the first index whose cumulative weight exceeds `rng() * total`.
/// Non-positive and non-finite weights never win.
pub fn select_weighted_by<T, F, R>(
    candidates: &[T],
    weight_of: F,
    rng: &mut R,
) -> Result<usize, RuntimeError>
where
    F: Fn(&T) -> f64,
    R: RandomSource + ?Sized,
{
    if candidates.is_empty() {
        return Err(RuntimeError::NoEligibleContent);
    }

    let cumulative: Vec<f64> = candidates
        .iter()
        .scan(0.0, |total, candidate| {
            *total += effective_weight(weight_of(candidate));
            Some(*total)
        })
        .collect();

    let total = cumulative.last().copied().unwrap_or(0.0);
    if total <= 0.0 {
        return Err(RuntimeError::InvalidWeight {
            candidates: candidates.len(),
        });
    }

    let draw = rng.next_unit() * total;
    if let Some(index) = cumulative.iter().position(|bound| *bound > draw) {
        return Ok(index);
    }

    // A draw at or past the total only happens for a source returning >= 1.0.
    let last = candidates
        .iter()
        .rposition(|candidate| effective_weight(weight_of(candidate)) > 0.0)
        .unwrap_or(candidates.len() - 1);
    Ok(last)
}

pub fn select_weighted<'a, T, R>(candidates: &'a [T], rng: &mut R) -> Result<&'a T, RuntimeError>
where
    T: Weighted,
    R: RandomSource + ?Sized,
{
    let index = select_weighted_by(candidates, |candidate| candidate.weight(), rng)?;
    Ok(&candidates[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    struct Entry(f64);

    impl Weighted for Entry {
        fn weight(&self) -> f64 {
            self.0
        }
    }

    fn pick(weights: &[f64], draw: f64) -> Result<usize, RuntimeError> {
        let entries: Vec<Entry> = weights.iter().copied().map(Entry).collect();
        let mut rng = SequenceRandom::new(vec![draw]);
        select_weighted(&entries, &mut rng).map(|entry| {
            entries
                .iter()
                .position(|candidate| std::ptr::eq(candidate, entry))
                .unwrap_or(usize::MAX)
        })
    }

    #[test]
    fn fixed_draws_are_reproducible() {
        assert_eq!(pick(&[1.0, 3.0], 0.1), Ok(0));
        assert_eq!(pick(&[1.0, 3.0], 0.9), Ok(1));
        assert_eq!(pick(&[1.0, 3.0], 0.0), Ok(0));
        assert_eq!(pick(&[1.0, 3.0], 0.25), Ok(1));
    }

    #[test]
    fn zero_weight_candidates_are_skipped() {
        assert_eq!(pick(&[0.0, 2.0, 0.0], 0.0), Ok(1));
        assert_eq!(pick(&[0.0, 2.0, 0.0], 0.99), Ok(1));
        assert_eq!(pick(&[-5.0, f64::NAN, 1.0], 0.5), Ok(2));
    }

    #[test]
    fn out_of_contract_draw_falls_back_to_last_positive_candidate() {
        assert_eq!(pick(&[1.0, 1.0, 0.0], 1.0), Ok(1));
    }

    #[test]
    fn empty_candidates_signal_missing_content() {
        assert_eq!(pick(&[], 0.5), Err(RuntimeError::NoEligibleContent));
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        assert_eq!(
            pick(&[0.0, 0.0], 0.5),
            Err(RuntimeError::InvalidWeight { candidates: 2 })
        );
    }

    #[test]
    fn frequencies_converge_to_weight_share() {
        let entries = vec![Entry(1.0), Entry(3.0), Entry(6.0)];
        let mut rng = SmallRng::seed_from_u64(2024);
        let mut counts = [0usize; 3];
        let draws = 20_000;
        for _ in 0..draws {
            let index = select_weighted_by(&entries, |entry| entry.0, &mut rng)
                .expect("selection should succeed");
            counts[index] += 1;
        }
        for (index, expected) in [0.1, 0.3, 0.6].iter().enumerate() {
            let share = counts[index] as f64 / draws as f64;
            assert!(
                (share - expected).abs() < 0.02,
                "candidate {index} drawn {share}, expected {expected}"
            );
        }
    }

    #[test]
    fn sequence_wraps_around() {
        let mut rng = SequenceRandom::new(vec![0.1, 0.2]);
        assert_eq!(rng.next_unit(), 0.1);
        assert_eq!(rng.next_unit(), 0.2);
        assert_eq!(rng.next_unit(), 0.1);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn closures_act_as_sources() {
        let mut calls = 0;
        let mut rng = FnRandom(|| {
            calls += 1;
            0.75
        });
        let entries = vec![Entry(1.0), Entry(1.0)];
        let chosen = select_weighted_by(&entries, |entry| entry.0, &mut rng);
        assert_eq!(chosen, Ok(1));
        drop(rng);
        assert_eq!(calls, 1);
    }
}
