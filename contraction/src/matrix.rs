use rand::Rng;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Dense row-major host matrix.
#[derive(Clone, PartialEq, Debug)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.; rows * cols],
        }
    }

    /// Values drawn uniformly from `[-0.5, 0.5)`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self {
            rows,
            cols,
            data: (0..rows * cols)
                .map(|_| rng.random_range(-0.5..0.5))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    #[inline]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Host reference product, accumulated in `f64`.
    pub fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(self.cols, rhs.rows, "inner dimensions disagree");
        let mut acc = vec![0.0f64; self.rows * rhs.cols];
        for (lhs, out) in self
            .data
            .chunks_exact(self.cols)
            .zip(acc.chunks_exact_mut(rhs.cols))
        {
            for (&x, row) in lhs.iter().zip(rhs.data.chunks_exact(rhs.cols)) {
                for (o, &y) in out.iter_mut().zip(row) {
                    *o += x as f64 * y as f64;
                }
            }
        }
        Self {
            rows: self.rows,
            cols: rhs.cols,
            data: acc.into_iter().map(|x| x as f32).collect(),
        }
    }

    /// NaN if either side holds a NaN.
    pub fn max_abs_diff(&self, other: &Self) -> f32 {
        assert_eq!(self.shape(), other.shape());
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0., |max, d| if d > max || d.is_nan() { d } else { max })
    }

    /// One row per line, values separated by a single space.
    pub fn write_to(&self, mut w: impl Write) -> io::Result<()> {
        for row in self.data.chunks_exact(self.cols) {
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    w.write_all(b" ")?
                }
                write!(w, "{x:.6}")?
            }
            writeln!(w)?
        }
        w.flush()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.write_to(BufWriter::new(File::create(path)?))
    }
}

#[cfg(test)]
mod test {
    use super::Matrix;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_matmul() {
        // |10 10|    |1 1 1 1|   |1 1|
        // |20 20| <- |2 2 2 2| · |2 2|
        // |30 30|    |3 3 3 3|   |3 3|
        //                        |4 4|
        let a = Matrix::from_vec(3, 4, (0..12).map(|i| (i / 4 + 1) as _).collect());
        let b = Matrix::from_vec(4, 2, (0..8).map(|i| (i / 2 + 1) as _).collect());
        let c = a.matmul(&b);
        assert_eq!(c.shape(), (3, 2));
        assert_eq!(c.as_slice(), [10., 10., 20., 20., 30., 30.]);
    }

    #[test]
    #[should_panic(expected = "inner dimensions disagree")]
    fn test_matmul_mismatch() {
        Matrix::zeros(2, 3).matmul(&Matrix::zeros(2, 3));
    }

    #[test]
    fn test_random() {
        let a = Matrix::random(96, 64, &mut StdRng::seed_from_u64(1));
        let b = Matrix::random(96, 64, &mut StdRng::seed_from_u64(2));
        assert_eq!(a.shape(), (96, 64));
        assert!(a.as_slice().iter().all(|x| (-0.5..0.5).contains(x)));
        assert_ne!(a, b);
        assert_eq!(a, Matrix::random(96, 64, &mut StdRng::seed_from_u64(1)));
    }

    #[test]
    fn test_max_abs_diff() {
        let a = Matrix::from_vec(1, 3, vec![1., 2., 3.]);
        let b = Matrix::from_vec(1, 3, vec![1., 2.5, 2.75]);
        assert_eq!(a.max_abs_diff(&a), 0.);
        assert_eq!(a.max_abs_diff(&b), 0.5);

        let nan = Matrix::from_vec(1, 3, vec![f32::NAN, 2., f32::NAN]);
        let d = a.max_abs_diff(&nan);
        assert!(d.is_nan());
        assert!(!(d <= 1e-3));
        assert!(nan.max_abs_diff(&a).is_nan());
    }

    #[test]
    fn test_write() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = Matrix::random(96, 64, &mut rng);
        let b = Matrix::random(64, 128, &mut rng);
        let c = a.matmul(&b);

        let mut text = Vec::new();
        c.write_to(&mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.ends_with('\n'));

        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 96);
        let parsed = lines
            .iter()
            .flat_map(|line| {
                let tokens = line.split(' ').collect::<Vec<_>>();
                assert_eq!(tokens.len(), 128);
                tokens
            })
            .map(|token| token.parse::<f32>().unwrap())
            .collect();
        let parsed = Matrix::from_vec(96, 128, parsed);
        assert!(parsed.max_abs_diff(&c) <= 1e-6);
    }

    #[test]
    fn test_save() {
        let path = std::env::temp_dir().join(format!("contraction-{}.txt", std::process::id()));
        let m = Matrix::from_vec(2, 2, vec![1., -0.5, 0.25, 0.]);
        m.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, "1.000000 -0.500000\n0.250000 0.000000\n");
    }

    #[test]
    fn test_save_bad_path() {
        let dir = std::env::temp_dir().join("contraction-missing-dir").join("x");
        assert!(Matrix::zeros(1, 1).save(dir.join("out.txt")).is_err());
    }
}
