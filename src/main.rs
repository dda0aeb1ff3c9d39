use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(
    name = "mirage",
    version,
    about = "Variational autoencoder that hallucinates handwritten digits"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a VAE on binarized MNIST
    Train(cli::train::TrainArgs),
    /// Decode latent samples from the prior into novel digits
    Hallucinate(cli::hallucinate::HallucinateArgs),
    /// Round-trip test digits through the posterior mean
    Reconstruct(cli::reconstruct::ReconstructArgs),
    /// Show checkpoints and model layout for an artifact directory
    Info(cli::info::InfoArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Train(args) => cli::train::cmd_train(args),
        Command::Hallucinate(args) => cli::hallucinate::cmd_hallucinate(args),
        Command::Reconstruct(args) => cli::reconstruct::cmd_reconstruct(args),
        Command::Info(args) => cli::info::cmd_info(args),
    }
}
