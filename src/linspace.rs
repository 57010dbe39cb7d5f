use std::iter::FusedIterator;

/// `len` evenly spaced points from `start` to `end` inclusive, like `numpy.linspace`.
#[derive(Clone, Debug)]
pub struct Linspace {
    start: f64,
    end: f64,
    step: f64,
    next: usize,
    len: usize,
}

impl Linspace {
    pub fn new(start: f64, end: f64, len: usize) -> Self {
        let step = match len {
            0 | 1 => 0.,
            n => (end - start) / (n - 1) as f64,
        };

        Linspace {
            start,
            end,
            step,
            next: 0,
            len,
        }
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        let i = self.next;
        if i >= self.len {
            return None;
        }
        self.next += 1;

        // numpy pins the last sample to the endpoint to avoid accumulated drift
        if i > 0 && i + 1 == self.len {
            Some(self.end)
        } else {
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

impl FusedIterator for Linspace {}

#[test]
fn test_linspace() {
    assert_eq!(Linspace::new(0., 10., 5).collect::<Vec<_>>(), [0., 2.5, 5., 7.5, 10.]);
    assert_eq!(Linspace::new(3., 9., 1).collect::<Vec<_>>(), [3.]);
    assert_eq!(Linspace::new(3., 9., 0).len(), 0);
    assert_eq!(Linspace::new(0., 1., 11).last(), Some(1.));
}
