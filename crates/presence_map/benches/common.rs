use std::time::Duration;

use criterion::{Criterion, Throughput};
use presence_map::boundary::Boundary;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Star polygon with `spikes` outer vertices, inscribed in a 1000x600 view box.
pub fn star_boundary(spikes: usize) -> Boundary {
    let (cx, cy) = (500.0_f64, 300.0_f64);
    let mut d = String::new();
    for i in 0..spikes * 2 {
        let radius = if i % 2 == 0 { 290.0 } else { 120.0 };
        let angle = std::f64::consts::PI * i as f64 / spikes as f64;
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!(
            "{cmd}{:.3} {:.3} ",
            cx + radius * angle.cos(),
            cy + radius * angle.sin()
        ));
    }
    d.push('Z');
    let svg = format!(r#"<svg viewBox="0 0 1000 600"><path d="{d}"/></svg>"#);
    Boundary::from_svg_str(&svg).expect("star boundary parses")
}

/// Thin ring (outer minus inner circle) covering a small share of its view box.
pub fn ring_boundary() -> Boundary {
    let svg = r#"<svg viewBox="0 0 1000 1000">
        <path fill-rule="evenodd" d="M500 20 A480 480 0 1 1 499.9 20 Z M500 40 A460 460 0 1 1 499.9 40 Z"/>
    </svg>"#;
    Boundary::from_svg_str(svg).expect("ring boundary parses")
}
