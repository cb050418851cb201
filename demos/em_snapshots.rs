use std::error::Error;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::PathBuf;

use linfa_gmm::{Gaussian, GaussianMixtureModel, MixtureComponent, ShapeDescriptor};
use linfa_gmm_datasets::generate::{transformed_blobs, IrwinHallNormal};
use ndarray::{array, Array1, Array2};
use ndarray_rand::rand::distributions::Distribution;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use tracing::info;

const N_ITERATIONS: usize = 20;
const BLOB_SIZE: usize = 100;
const CANVAS: f64 = 600.;
const EXTENT: f64 = 12.;
const COLORS: [[f64; 3]; 3] = [[244., 67., 54.], [33., 150., 243.], [76., 175., 80.]];

// Fit a three component mixture to three skewed blobs, one EM step at a time,
// and draw every intermediate model to `snapshot_<i>.svg`.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)?;

    // Our random number generator, seeded for reproducibility
    let mut rng = Isaac64Rng::seed_from_u64(57);

    let centroids = array![[4., 4.3], [-4.5, 1.3], [0.5, -4.3]];
    let transforms = array![
        [[1.5, -0.4], [-0.3, 1.2]],
        [[0.9, -0.5], [0., 1.3]],
        [[1.0, 0.4], [0.5, 1.5]]
    ];
    let observations = transformed_blobs(
        BLOB_SIZE,
        &centroids,
        &transforms,
        IrwinHallNormal,
        &mut rng,
    );

    // every component starts from the Gaussian of the whole dataset, its mean moved at random
    let whole = Gaussian::fit(&observations, 1e-6)?;
    let n_components = COLORS.len();
    let components = (0..n_components)
        .map(|_| {
            let mean = whole.sample(&mut rng);
            Gaussian::new(mean, whole.covariance().clone())
                .map(|gaussian| MixtureComponent::new(1. / n_components as f64, gaussian))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut gmm = GaussianMixtureModel::new(components)?;

    for i in 0..N_ITERATIONS {
        let path = out_dir.join(format!("snapshot_{}.svg", i));
        fs::write(&path, render(&gmm, &observations)?)?;

        let step = gmm.update(&observations)?;
        info!(
            iteration = i,
            log_likelihood = step.log_likelihood,
            path = %path.display(),
            "snapshot written"
        );
        gmm = step.model;
    }

    for (k, component) in gmm.components().iter().enumerate() {
        info!(
            component = k,
            weight = component.weight(),
            mean = %component.gaussian().mean(),
            "final component"
        );
    }
    Ok(())
}

fn to_canvas(x: f64, y: f64) -> (f64, f64) {
    let scale = CANVAS / (2. * EXTENT);
    ((x + EXTENT) * scale, (EXTENT - y) * scale)
}

/// Responsibility weighted blend of the component colors
fn blend(responsibility: &Array1<f64>) -> String {
    let mut rgb = [0.; 3];
    for (r, color) in responsibility.iter().zip(COLORS.iter()) {
        for (channel, c) in rgb.iter_mut().zip(color.iter()) {
            *channel += r * c;
        }
    }
    format!(
        "rgb({},{},{})",
        rgb[0].round() as u8,
        rgb[1].round() as u8,
        rgb[2].round() as u8
    )
}

fn ellipse(
    svg: &mut String,
    center: &Array1<f64>,
    shape: &ShapeDescriptor<f64>,
    color: &[f64; 3],
) -> fmt::Result {
    let scale = CANVAS / (2. * EXTENT);
    let (cx, cy) = to_canvas(center[0], center[1]);
    let axes = shape.semi_axis_lengths();
    writeln!(
        svg,
        r#"  <ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" transform="rotate({:.2} {:.2} {:.2})" fill="none" stroke="rgb({},{},{})" stroke-width="2"/>"#,
        cx,
        cy,
        axes[0] * scale,
        axes[1] * scale,
        shape.rotation_degrees().unwrap_or(0.),
        cx,
        cy,
        color[0],
        color[1],
        color[2]
    )
}

fn render(
    gmm: &GaussianMixtureModel<f64>,
    observations: &Array2<f64>,
) -> Result<String, Box<dyn Error>> {
    let responsibilities = gmm.predict_responsibilities(observations)?;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}" viewBox="0 0 {0} {0}">"#,
        CANVAS
    )?;
    writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#)?;
    for (point, resp) in observations.rows().into_iter().zip(responsibilities.rows()) {
        let (x, y) = to_canvas(point[0], point[1]);
        writeln!(
            svg,
            r#"  <circle cx="{:.2}" cy="{:.2}" r="3" fill="{}"/>"#,
            x,
            y,
            blend(&resp.to_owned())
        )?;
    }
    for (component, color) in gmm.components().iter().zip(COLORS.iter()) {
        let gaussian = component.gaussian();
        ellipse(&mut svg, gaussian.mean(), &gaussian.shape()?, color)?;
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}
