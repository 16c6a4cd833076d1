use tetrapod::observation::ObservationBuilder;
use tetrapod::{EnvConfig, RewardConfig, RewardModel, ScriptedSimulator, TetrapodEnv, Trajectory};

const OBS_SIZE: usize = 12;
const ACT_SIZE: usize = 8;

// A robot that speeds up towards the target velocity, starts to tilt and
// finally rolls over.
fn script() -> Vec<Vec<f64>> {
    let mut frames = vec![ObservationBuilder::new(OBS_SIZE).build()];
    for i in 1..=8 {
        let t = i as f64;
        frames.push(
            ObservationBuilder::new(OBS_SIZE)
                .position(&[0.03 * t, 0.002 * t])
                .forward_velocity(0.05 * t)
                .lateral_velocity(0.01 * t)
                .roll(0.04 * t)
                .pitch(-0.01 * t)
                .build(),
        );
    }
    frames.into_iter().map(|obs| obs.into_inner()).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = EnvConfig::new(OBS_SIZE, ACT_SIZE, vec![2.0, 0.0]).with_seed(0);
    let mut env = TetrapodEnv::new(config, ScriptedSimulator::new(script()))?;

    let mut trajectory = Trajectory::record(&mut env, |_| vec![0.0; ACT_SIZE], 100)?;
    println!(
        "recorded {} steps, return {:.3}, max return from start {:.1}",
        trajectory.len(),
        trajectory.total_reward(),
        env.max_ret(&trajectory.initial),
    );
    for (i, step) in trajectory.steps.iter().enumerate() {
        println!("step {i}: reward {:+.3} {:?}", step.reward, step.termination);
    }

    // Relabel with a faster target velocity without re-simulating.
    let faster = RewardModel::new(
        RewardConfig {
            target_velocity: 0.4,
            ..RewardConfig::default()
        },
        2,
    )?;
    println!("relabeled return {:.3}", trajectory.relabel(&faster));

    Ok(())
}
