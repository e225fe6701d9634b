//! Iteration-by-iteration access to a series.
//!
//! Both views keep a single iteration open: moving on to another iteration
//! closes the previous one through [`Series::close_iteration`], so its data is
//! written (and, for file-based series, its file closed) before the next one
//! is touched.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::iteration::Iteration;
use crate::series::Series;

/// Write view over the iterations of a series, see [`Series::write_iterations`].
///
/// Dropping the view closes the iteration that is still open.
#[derive(Debug)]
pub struct WriteIterations<'a> {
    series: &'a mut Series,
    current: Option<u64>,
}

impl<'a> WriteIterations<'a> {
    pub(crate) fn new(series: &'a mut Series) -> Self {
        Self {
            series,
            current: None,
        }
    }

    /// Iteration `index`, created if missing. Closes the previously used
    /// iteration if it differs from `index`.
    pub fn get_or_create(&mut self, index: u64) -> Result<&mut Iteration> {
        if self.series.iterations.get(&index).is_some_and(Iteration::closed) {
            return Err(Error::WrongApiUsage(format!(
                "Iteration {index} has already been closed"
            )));
        }
        if let Some(previous) = self.current {
            if previous != index {
                self.close_current()?;
            }
        }
        let iteration = self.series.iterations.get_or_create(index)?;
        self.current = Some(index);
        Ok(iteration)
    }

    /// Index of the iteration currently open for writing.
    pub fn current(&self) -> Option<u64> {
        self.current
    }

    /// Close the currently open iteration, if any.
    pub fn close_current(&mut self) -> Result<()> {
        match self.current.take() {
            Some(index) if !self.is_closed(index) => self.series.close_iteration(index),
            _ => Ok(()),
        }
    }

    fn is_closed(&self, index: u64) -> bool {
        self.series
            .iterations
            .get(&index)
            .map_or(true, Iteration::closed)
    }
}

impl Drop for WriteIterations<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close_current() {
            log::error!("failed to close iteration on drop: {e}");
        }
    }
}

/// Read view over the iterations of a series in ascending order, see
/// [`Series::read_iterations`].
///
/// Iterations that were closed before the view was created are skipped.
#[derive(Debug)]
pub struct ReadIterations<'a> {
    series: &'a mut Series,
    pending: VecDeque<u64>,
    current: Option<u64>,
}

impl<'a> ReadIterations<'a> {
    pub(crate) fn new(series: &'a mut Series) -> Self {
        let pending = series
            .iterations
            .iter()
            .filter(|(_, iteration)| !iteration.closed())
            .map(|(index, _)| *index)
            .collect();
        Self {
            series,
            pending,
            current: None,
        }
    }

    /// Close the previous iteration and hand out the next one. `None` once all
    /// iterations have been visited.
    pub fn next_iteration(&mut self) -> Option<Result<(u64, &mut Iteration)>> {
        if let Some(previous) = self.current.take() {
            if let Err(e) = self.series.close_iteration(previous) {
                return Some(Err(e));
            }
        }
        let index = self.pending.pop_front()?;
        self.current = Some(index);
        Some(
            self.series
                .iterations
                .get_mut(&index)
                .map(|iteration| (index, iteration))
                .ok_or_else(|| Error::Internal(format!("iteration {index} vanished while reading"))),
        )
    }

    /// Number of iterations not handed out yet.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for ReadIterations<'_> {
    fn drop(&mut self) {
        if let Some(index) = self.current.take() {
            if let Err(e) = self.series.close_iteration(index) {
                log::error!("failed to close iteration {index} on drop: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustypmd_io::Access;

    fn dummy(path: &str) -> Series {
        Series::with_options(path, Access::Create, r#"{"backend": "dummy"}"#).unwrap()
    }

    #[test]
    fn switching_closes_previous() {
        let mut series = dummy("out/w%T.bin");
        {
            let mut steps = series.write_iterations();
            steps.get_or_create(1).unwrap();
            assert_eq!(steps.current(), Some(1));
            // same index again keeps it open
            steps.get_or_create(1).unwrap().set_time(0.5f64).unwrap();
            steps.get_or_create(2).unwrap();
            assert_eq!(steps.current(), Some(2));
            assert!(matches!(steps.get_or_create(1), Err(Error::WrongApiUsage(_))));
            assert_eq!(steps.current(), Some(2));
        }
        assert!(series.iterations.get(&1u64).unwrap().closed());
        assert!(series.iterations.get(&2u64).unwrap().closed());
    }

    #[test]
    fn close_current_is_idempotent() {
        let mut series = dummy("out/w%T.bin");
        let mut steps = series.write_iterations();
        steps.close_current().unwrap();
        steps.get_or_create(7).unwrap();
        steps.close_current().unwrap();
        steps.close_current().unwrap();
        assert_eq!(steps.current(), None);
    }

    #[test]
    fn reading_visits_in_order_and_skips_closed() {
        let mut series = dummy("out/r%T.bin");
        for index in [30u64, 4, 12] {
            series.iterations.get_or_create(index).unwrap();
        }
        series.close_iteration(12).unwrap();

        let mut seen = Vec::new();
        let mut steps = series.read_iterations();
        assert_eq!(steps.remaining(), 2);
        while let Some(step) = steps.next_iteration() {
            let (index, iteration) = step.unwrap();
            assert!(!iteration.closed());
            seen.push(index);
        }
        drop(steps);
        assert_eq!(seen, vec![4, 30]);
        assert!(series.iterations.iter().all(|(_, it)| it.closed()));
    }
}
