use std::f32::consts::PI;

/// Lower bound of the byte frequency scale, in dBFS.
pub(crate) const MIN_DECIBELS: f32 = -100.0;
/// Upper bound of the byte frequency scale, in dBFS.
pub(crate) const MAX_DECIBELS: f32 = -30.0;
/// Weight of the previous frame when smoothing magnitudes.
pub(crate) const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

pub(crate) fn blackman_window(len: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;

    (0..len)
        .map(|n| {
            let x = n as f32 / len as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}

/// Normalised magnitude of the first `n / 2` frequency bins, where `n` is
/// the largest power of two that fits both `samples` and `window`.
pub(crate) fn magnitudes(samples: &[f32], window: &[f32]) -> Vec<f32> {
    let n = largest_power_of_two(samples.len().min(window.len()));
    if n < 2 {
        return Vec::new();
    }

    let mut re: Vec<f32> = samples[..n]
        .iter()
        .zip(window)
        .map(|(&sample, &w)| sample * w)
        .collect();
    let mut im = vec![0.0f32; n];
    fft_in_place(&mut re, &mut im);

    (0..n / 2)
        .map(|k| (re[k] * re[k] + im[k] * im[k]).sqrt() / n as f32)
        .collect()
}

fn largest_power_of_two(len: usize) -> usize {
    match len {
        0 => 0,
        _ => 1 << (usize::BITS - 1 - len.leading_zeros()),
    }
}

/// Iterative radix-2 transform. `re.len()` is a power of two, at least 2.
fn fft_in_place(re: &mut [f32], im: &mut [f32]) {
    let n = re.len();
    let bits = n.trailing_zeros();

    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = -2.0 * PI / len as f32;

        for k in 0..half {
            let (sin, cos) = (step * k as f32).sin_cos();
            for a in (k..n).step_by(len) {
                let b = a + half;
                let tr = re[b] * cos - im[b] * sin;
                let ti = re[b] * sin + im[b] * cos;
                re[b] = re[a] - tr;
                im[b] = im[a] - ti;
                re[a] += tr;
                im[a] += ti;
            }
        }

        len <<= 1;
    }
}

pub(crate) fn smooth(previous: &mut [f32], current: &[f32]) {
    for (prev, &cur) in previous.iter_mut().zip(current) {
        let next = SMOOTHING_TIME_CONSTANT * *prev + (1.0 - SMOOTHING_TIME_CONSTANT) * cur;
        *prev = if next.is_finite() { next } else { 0.0 };
    }
}

pub(crate) fn to_decibels(magnitude: f32) -> f32 {
    20.0 * magnitude.log10()
}

pub(crate) fn decibels_to_byte(db: f32) -> u8 {
    let scaled = 255.0 / (MAX_DECIBELS - MIN_DECIBELS) * (db - MIN_DECIBELS);
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

pub(crate) fn sample_to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).clamp(0.0, 255.0) as u8
}

pub(crate) fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

pub(crate) fn peak_level(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}
