//! Largest-Triangle-Three-Buckets downsampling.

use chrono::{Datelike, NaiveDate};
use num_traits::ToPrimitive;

use crate::portfolio::equity_curve::EquityCurvePoint;
use crate::simulation::DcaDailyPoint;

/// A point with a numeric x (time) and y (value) for the triangle-area test.
pub trait ChartPoint {
    fn coordinates(&self) -> (f64, f64);
}

fn date_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

impl ChartPoint for EquityCurvePoint {
    fn coordinates(&self) -> (f64, f64) {
        (date_x(self.date), self.total_value.to_f64().unwrap_or(0.0))
    }
}

/// DCA rows are bucketed on the periodic-buyer series.
impl ChartPoint for DcaDailyPoint {
    fn coordinates(&self) -> (f64, f64) {
        (date_x(self.date), self.dca_value.to_f64().unwrap_or(0.0))
    }
}

/// Downsamples `points` to at most `target` entries.
pub fn downsample<T: ChartPoint + Clone>(points: &[T], target: usize) -> Vec<T> {
    downsample_by(points, target, T::coordinates)
}

/// Downsamples with an explicit coordinate accessor.
///
/// Series no longer than `target` come back unchanged. Otherwise the first and
/// last points are kept and each of the `target - 2` inner buckets contributes
/// the point forming the largest triangle with the previously kept point and the
/// average of the next bucket. A `target` below 2 is treated as 2.
pub fn downsample_by<T, F>(points: &[T], target: usize, coords: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> (f64, f64),
{
    let len = points.len();
    let target = target.max(2);
    if len <= target {
        return points.to_vec();
    }

    let mut sampled = Vec::with_capacity(target);
    sampled.push(points[0].clone());

    let inner_buckets = target - 2;
    if inner_buckets > 0 {
        let bucket_size = (len - 2) as f64 / inner_buckets as f64;
        let mut anchor = 0usize;

        for bucket in 0..inner_buckets {
            let start = bucket_bound(bucket, bucket_size, len);
            let end = bucket_bound(bucket + 1, bucket_size, len).max(start + 1);

            // Average of the following bucket, or the last point for the final one.
            let next_start = end;
            let next_end = bucket_bound(bucket + 2, bucket_size, len).min(len);
            let (avg_x, avg_y) = if next_start < next_end {
                average(&points[next_start..next_end], &coords)
            } else {
                coords(&points[len - 1])
            };

            let (ax, ay) = coords(&points[anchor]);
            let mut best = start;
            let mut best_area = -1.0_f64;
            for (offset, point) in points[start..end].iter().enumerate() {
                let (px, py) = coords(point);
                let area = ((ax - avg_x) * (py - ay) - (ax - px) * (avg_y - ay)).abs();
                if area > best_area {
                    best_area = area;
                    best = start + offset;
                }
            }

            sampled.push(points[best].clone());
            anchor = best;
        }
    }

    sampled.push(points[len - 1].clone());
    sampled
}

/// Start index of inner bucket `i`; inner points span `1..len - 1`.
fn bucket_bound(i: usize, bucket_size: f64, len: usize) -> usize {
    ((i as f64 * bucket_size).floor() as usize + 1).min(len - 1)
}

fn average<T, F>(points: &[T], coords: &F) -> (f64, f64)
where
    F: Fn(&T) -> (f64, f64),
{
    let (sum_x, sum_y) = points.iter().fold((0.0, 0.0), |(sx, sy), p| {
        let (x, y) = coords(p);
        (sx + x, sy + y)
    });
    let n = points.len() as f64;
    (sum_x / n, sum_y / n)
}
