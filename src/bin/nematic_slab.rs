// -----------------------------------------------------------------------------
// Nematic slab between two anchoring walls
//
// Geometry:
//   lx × ly × lz cubic lattice, periodic in x and y, one wall layer at each z end.
//   Bottom wall: homeotropic (director along z).
//   Top wall:    degenerate planar (normal along z).
//
// Physics:
//   Landau–de Gennes phase energy (deep nematic), multi-constant elasticity,
//   optional electric field along x.
//
// Dynamics:
//   Plain overdamped descent q <- q + dt F. Only used to show the energy
//   decreasing; not a production integrator.
//
// RUN
//   RUST_LOG=info cargo run --release --bin nematic_slab
//   LDG_EXECUTION=serial cargo run --release --bin nematic_slab
//
// Outputs:
//   out/nematic_slab/
//     ├── config.json      # run snapshot
//     ├── energy.csv       # step,phase,distortion,anchoring,e_field,h_field,total
//     └── profile_z.csv    # z,q0,q1,q2,q3,q4 along the centre column
// -----------------------------------------------------------------------------

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use qtensor_ldg::config::{FieldConfig, LatticeConfig, RunConfig, RunInfo};
use qtensor_ldg::free_energy::{ForcePass, LandauDeGennes, WriteMode};
use qtensor_ldg::geometry_mask::{add_boundary, mask_from_fn};
use qtensor_ldg::initial_states::init_uniform_with_noise;
use qtensor_ldg::lattice::{BoundaryObject, CubicLattice, Edges, Lattice};
use qtensor_ldg::params::{ElasticConstants, FieldCoupling};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (lx, ly, lz) = (8, 8, 20);
    let s0 = 0.53;
    let dt = 0.05;
    let steps = 400;
    let stride = 20;

    let mut lattice = CubicLattice::new(lx, ly, lz, Edges::Periodic);
    let half = 0.5 * lz as f64 - 1.0;
    let bottom = mask_from_fn(&lattice, |p| p[2] < -half);
    let top = mask_from_fn(&lattice, |p| p[2] > half);
    add_boundary(&mut lattice, &bottom, BoundaryObject::homeotropic(5.0, s0), |_| [0.0, 0.0, 1.0]);
    add_boundary(&mut lattice, &top, BoundaryObject::degenerate_planar(5.0, 5.0, s0), |_| [0.0, 0.0, -1.0]);
    init_uniform_with_noise(&mut lattice, [1.0, 1.0, 1.0], s0, 0.2, 42);

    let constants = ElasticConstants::multi_constant(-0.172, -2.12, 1.73, 1.0, 0.5, 0.0, 0.0, 0.1);
    let e_field = FieldCoupling::electric([0.3, 0.0, 0.0], 1.0, 1.0).with_scale(1.0);

    let mut ldg = LandauDeGennes::new(constants);
    ldg.set_e_field(e_field, true);
    ldg.bind_lattice(&mut lattice)?;

    let out_dir = Path::new("out").join("nematic_slab");
    create_dir_all(&out_dir)?;
    RunConfig {
        lattice: LatticeConfig::from_lattice(&lattice),
        constants,
        boundaries: lattice.boundaries.clone(),
        fields: FieldConfig {
            e_field: Some(e_field),
            h_field: None,
        },
        execution: ldg.execution_mode(),
        run: RunInfo {
            binary: "nematic_slab".to_string(),
            run_id: "nematic_slab".to_string(),
            git_commit: None,
            timestamp_utc: None,
        },
    }
    .write_to_dir(&out_dir)?;

    let mut energy_csv = BufWriter::new(File::create(out_dir.join("energy.csv"))?);
    writeln!(energy_csv, "step,phase,distortion,anchoring,e_field,h_field,total")?;

    let mut forces = vec![[0.0; 5]; lattice.n_sites()];
    for step in 0..=steps {
        if step % stride == 0 {
            let e = ldg.compute_energy(&lattice, step % (5 * stride) == 0)?;
            writeln!(
                energy_csv,
                "{step},{:.10e},{:.10e},{:.10e},{:.10e},{:.10e},{:.10e}",
                e.phase, e.distortion, e.anchoring, e.e_field, e.h_field, e.total
            )?;
        }
        if step == steps {
            break;
        }
        ldg.compute_forces(&lattice, &mut forces, WriteMode::Overwrite, ForcePass::Full)?;
        for (q, f) in lattice.q.iter_mut().zip(&forces) {
            for m in 0..5 {
                q[m] += dt * f[m];
            }
        }
    }
    energy_csv.flush()?;

    let mut profile = BufWriter::new(File::create(out_dir.join("profile_z.csv"))?);
    writeln!(profile, "z,q0,q1,q2,q3,q4")?;
    for k in 0..lz {
        let q = lattice.q[lattice.idx(lx / 2, ly / 2, k)];
        writeln!(profile, "{k},{},{},{},{},{}", q[0], q[1], q[2], q[3], q[4])?;
    }
    profile.flush()?;

    log::info!("wrote {}", out_dir.display());
    Ok(())
}
