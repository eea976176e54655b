//! Trains a small network on the XOR truth table and prints its predictions.

use ffnet::{Activation, Dataset, FitConfig, NetworkBuilder, Sgd, Shuffle};

fn main() -> ffnet::Result<()> {
    let mut train = Dataset::new(2, 1)?;
    train.add_sample(&[0.0, 0.0], &[0.0])?;
    train.add_sample(&[0.0, 1.0], &[1.0])?;
    train.add_sample(&[1.0, 0.0], &[1.0])?;
    train.add_sample(&[1.0, 1.0], &[0.0])?;

    let mut net = NetworkBuilder::new(2)?
        .add_layer(4, Activation::Tanh)?
        .add_layer(1, Activation::Sigmoid)?
        .build_with_seed(0)?;

    let sgd = Sgd::new(0.5)?;
    let report = net.fit(
        &mut train,
        &sgd,
        FitConfig {
            epochs: 2000,
            batch_size: 4,
            shuffle: Shuffle::Seeded(0),
        },
    )?;

    println!(
        "mean epoch loss: {:.6} -> {:.6}",
        report.epoch_losses[0],
        report.final_loss().unwrap()
    );

    for input in [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]] {
        let out = net.predict(&input)?;
        println!("{:?} -> {:.4}", input, out[0]);
    }

    Ok(())
}
