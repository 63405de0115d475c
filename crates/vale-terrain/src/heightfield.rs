//! Square grids of sampled heights with triangle-split interpolation.

/// Row-major square grid of heights anchored at a world-space origin.
///
/// Vertex `(col, row)` sits at `(origin_x + col * step, origin_z + row * step)`
/// and is stored at `row * width + col`. Values are kept as `f32` to match
/// what mesh builders upload.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    origin_x: f64,
    origin_z: f64,
    step: f64,
    width: usize,
    values: Vec<f32>,
}

impl HeightField {
    /// Fill a `width x width` grid by calling `f(x, z)` at every vertex, row by row.
    ///
    /// `width` must be at least 2 and `step` positive; callers get both from a
    /// validated [`WorldConfig`](crate::WorldConfig).
    pub fn from_fn(
        origin_x: f64,
        origin_z: f64,
        step: f64,
        width: usize,
        mut f: impl FnMut(f64, f64) -> f64,
    ) -> Self {
        let mut values = Vec::with_capacity(width * width);
        for row in 0..width {
            let z = origin_z + row as f64 * step;
            for col in 0..width {
                let x = origin_x + col as f64 * step;
                values.push(f(x, z) as f32);
            }
        }
        Self {
            origin_x,
            origin_z,
            step,
            width,
            values,
        }
    }

    /// A grid of zeros.
    pub fn zeroed(origin_x: f64, origin_z: f64, step: f64, width: usize) -> Self {
        Self {
            origin_x,
            origin_z,
            step,
            width,
            values: vec![0.0; width * width],
        }
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_z)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Vertices per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raw values, row-major.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// World-space position of a vertex.
    pub fn position(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.step,
            self.origin_z + row as f64 * self.step,
        )
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Overwrite one vertex. Out-of-range indices are ignored.
    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        if col < self.width && row < self.width {
            self.values[row * self.width + col] = value;
        }
    }

    /// Far corner of the grid's extent.
    pub fn max_extent(&self) -> (f64, f64) {
        let span = self.step * (self.width - 1) as f64;
        (self.origin_x + span, self.origin_z + span)
    }

    /// Whether `(x, z)` lies inside the grid's extent (edges included).
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let (max_x, max_z) = self.max_extent();
        (self.origin_x..=max_x).contains(&x) && (self.origin_z..=max_z).contains(&z)
    }

    /// Interpolated height at `(x, z)`, or `None` outside the extent.
    ///
    /// Each cell is split along its `(1,0)-(0,1)` diagonal; the point is
    /// interpolated on whichever triangle contains it, matching how the
    /// cell is triangulated for rendering.
    pub fn sample(&self, x: f64, z: f64) -> Option<f64> {
        if self.width < 2 || !self.contains(x, z) {
            return None;
        }

        let max_coord = (self.width - 1) as f64 - 1e-6;
        let fx = ((x - self.origin_x) / self.step).clamp(0.0, max_coord);
        let fz = ((z - self.origin_z) / self.step).clamp(0.0, max_coord);
        let ix = fx.floor() as usize;
        let iz = fz.floor() as usize;
        let tx = fx - ix as f64;
        let tz = fz - iz as f64;

        let i00 = iz * self.width + ix;
        let i01 = i00 + self.width;
        let h00 = f64::from(self.values[i00]);
        let h10 = f64::from(self.values[i00 + 1]);
        let h01 = f64::from(self.values[i01]);
        let h11 = f64::from(self.values[i01 + 1]);

        if tx + tz <= 1.0 {
            Some(h00 + (h10 - h00) * tx + (h01 - h00) * tz)
        } else {
            Some(h11 + (h10 - h11) * (1.0 - tz) + (h01 - h11) * (1.0 - tx))
        }
    }

    /// Like [`sample`](Self::sample), but a point at most `slack` outside the
    /// extent is first pulled onto the nearest edge.
    ///
    /// For callers whose own tile lookup can land a rounding error away from
    /// the stored extent. Anything further out is still `None`.
    pub fn sample_within(&self, x: f64, z: f64, slack: f64) -> Option<f64> {
        let slack = slack.max(0.0);
        let (max_x, max_z) = self.max_extent();
        let x_ok = (self.origin_x - slack..=max_x + slack).contains(&x);
        let z_ok = (self.origin_z - slack..=max_z + slack).contains(&z);
        if !x_ok || !z_ok {
            return None;
        }
        self.sample(x.clamp(self.origin_x, max_x), z.clamp(self.origin_z, max_z))
    }
}
