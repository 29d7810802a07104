use std::{f64::consts::PI, fmt::Write};

/// Input options for [`radar_path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarShape {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub distortion: f64,
    pub seed: f64,
}

impl Default for RadarShape {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            padding: 30.0,
            distortion: 0.0,
            seed: 1.0,
        }
    }
}

impl RadarShape {
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) / 2.0 - self.padding
    }

    /// Point for the `index`-th of `count` values, before any rounding.
    pub fn point(&self, index: usize, count: usize, value: f64) -> (f64, f64) {
        let i = index as f64;
        let noise = (i * self.seed).sin() * (self.seed * i).cos() * self.distortion;
        let value = (value + noise).clamp(0.0, 100.0);

        let angle = 2.0 * PI * i / count as f64 - PI / 2.0;
        let r = value / 100.0 * self.radius();

        (
            self.width / 2.0 + r * angle.cos(),
            self.height / 2.0 + r * angle.sin(),
        )
    }
}

/// SVG path through every value in order, closed back to the first point.
///
/// Values are expected in `0..=100` and are clamped after noise is applied.
pub fn radar_path(values: &[f64], shape: &RadarShape) -> String {
    let mut path = String::new();

    for (index, &value) in values.iter().enumerate() {
        let (x, y) = shape.point(index, values.len(), value);
        let command = if index == 0 { 'M' } else { 'L' };

        if index > 0 {
            path.push(' ');
        }
        // writing to a String cannot fail
        let _ = write!(path, "{command}{x},{y}");
    }

    if !path.is_empty() {
        path.push_str(" Z");
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(path: &str) -> Vec<(f64, f64)> {
        path.split(' ')
            .filter(|part| *part != "Z")
            .map(|part| {
                let (x, y) = part[1..].split_once(',').unwrap();
                (x.parse().unwrap(), y.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn test_full_values_lie_on_circle() {
        let shape = RadarShape {
            width: 200.0,
            height: 300.0,
            padding: 10.0,
            ..RadarShape::default()
        };
        let path = radar_path(&[100.0, 100.0, 100.0, 100.0, 100.0], &shape);

        assert!(path.starts_with('M'));
        assert!(path.ends_with(" Z"));

        let radius = 90.0;
        for (x, y) in points(&path) {
            let distance = ((x - 100.0).powi(2) + (y - 150.0).powi(2)).sqrt();
            assert!((distance - radius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_values_scale_linearly() {
        let shape = RadarShape::default();
        let path = radar_path(&[50.0, 25.0], &shape);
        let pts = points(&path);

        // first point straight up from the center
        assert!((pts[0].0 - 150.0).abs() < 1e-9);
        assert!((pts[0].1 - (150.0 - 60.0)).abs() < 1e-9);

        let distance = ((pts[1].0 - 150.0).powi(2) + (pts[1].1 - 150.0).powi(2)).sqrt();
        assert!((distance - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp() {
        let shape = RadarShape::default();
        assert_eq!(
            radar_path(&[150.0, 40.0, 100.0], &shape),
            radar_path(&[100.0, 40.0, 100.0], &shape)
        );
        assert_eq!(
            radar_path(&[-20.0, 40.0], &shape),
            radar_path(&[0.0, 40.0], &shape)
        );
    }

    #[test]
    fn test_distortion_is_deterministic() {
        let shape = RadarShape {
            distortion: 15.0,
            seed: 3.0,
            ..RadarShape::default()
        };
        let values = [60.0, 70.0, 80.0, 90.0];

        let first = radar_path(&values, &shape);
        assert_eq!(first, radar_path(&values, &shape));
        assert_ne!(first, radar_path(&values, &RadarShape::default()));
    }

    #[test]
    fn test_empty() {
        assert_eq!(radar_path(&[], &RadarShape::default()), "");
    }
}
