use gnuplot::{AxesCommon, Caption, Color, Figure};
use photon_emission::calibration::{led_angular_profile, LED_ANGLE_DEG, LED_ANGULAR_INTENSITY};
use photon_emission::vec3::Vector;
use photon_emission::{DirectionSampler, RandStream};

const BIN_COUNT: usize = 90;
const EVENTS: usize = 200_000;

fn main() {
    let axis = Vector::new(0.0, 0.0, 1.0);
    let profile = led_angular_profile().expect("built-in profile is valid");
    let mut sampler = DirectionSampler::tabulated_polar(profile, axis, RandStream::seeded(2022))
        .expect("built-in profile lies within [0, 180] degrees");

    // sampled polar angle, one-degree bins
    let mut counts = vec![0.0; BIN_COUNT];
    for _ in 0..EVENTS {
        let emission = sampler.sample();
        let theta = emission.direction.angle(&axis).to_degrees();
        let idx = theta.floor() as usize;
        if idx < BIN_COUNT {
            counts[idx] += 1.0;
        }
    }
    let peak = counts.iter().cloned().fold(0.0, f64::max);
    let x: Vec<f64> = (0..BIN_COUNT).map(|i| i as f64 + 0.5).collect();
    let y: Vec<f64> = counts.iter().map(|c| c / peak).collect();

    let table_x: Vec<f64> = LED_ANGLE_DEG
        .windows(2)
        .map(|w| 0.5 * (w[0] + w[1]))
        .collect();
    let table_peak = LED_ANGULAR_INTENSITY.iter().cloned().fold(0.0, f64::max);
    let table_y: Vec<f64> = LED_ANGULAR_INTENSITY
        .iter()
        .map(|w| w / table_peak)
        .collect();

    let mut fg = Figure::new();
    fg.axes2d()
        .lines(x, y, &[Caption("sampled"), Color("black")])
        .points(table_x, table_y, &[Caption("table"), Color("red")])
        .set_x_range(gnuplot::Fix(0.0), gnuplot::Fix(90.0))
        .set_y_range(gnuplot::Fix(0.0), gnuplot::Fix(1.1));
    fg.show().expect("Failed to display the plot.");
}
