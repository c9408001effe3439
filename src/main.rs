// ecolink demo driver
//
// Wires a sender and/or receiver together from CLI flags. The bench
// subcommand is the in-process experiment harness: it force-sets the
// battery, feeds synthetic readings, and prints the packet/byte counters an
// external energy comparison would consume.

use clap::{Parser, Subcommand};
use ecolink::battery::Battery;
use ecolink::config::{PayloadFormat, ProtocolConfig};
use ecolink::link::UdpLink;
use ecolink::packet::Reading;
use ecolink::receiver::Receiver;
use ecolink::sender::{Sender, SenderError};
use std::error::Error;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecolink", about = "Energy-aware sensor transport demo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a receiver and print accepted deliveries
    Recv {
        #[arg(long, default_value = "127.0.0.1:5005")]
        listen: String,

        #[arg(long, value_enum, default_value_t = PayloadFormat::Delimited)]
        format: PayloadFormat,
    },

    /// Send synthetic sensor readings to a receiver
    Send {
        #[arg(long, default_value = "127.0.0.1:5005")]
        target: String,

        /// Number of synthetic readings to feed
        #[arg(long, default_value_t = 50)]
        count: u32,

        /// Starting battery level (percent of a 100-unit battery)
        #[arg(long, default_value_t = 100.0)]
        battery: f64,

        #[arg(long, value_enum, default_value_t = PayloadFormat::Delimited)]
        format: PayloadFormat,

        /// Simulated probability of datagram loss
        #[arg(long, default_value_t = 0.0)]
        loss: f64,
    },

    /// In-process sender + receiver pair; prints benchmark counters
    Bench {
        #[arg(long, default_value_t = 50)]
        count: u32,

        #[arg(long, default_value_t = 50.0)]
        battery: f64,

        #[arg(long, value_enum, default_value_t = PayloadFormat::Delimited)]
        format: PayloadFormat,
    },
}

/// Synthetic readings matching the payload format: text temperatures for the
/// delimited codec, one-byte samples for raw and sealed.
fn synthetic_readings(count: u32, format: PayloadFormat) -> Vec<Reading> {
    (0..count)
        .map(|i| match format {
            PayloadFormat::Delimited => format!("TEMP:{}", 20 + i).into_bytes(),
            PayloadFormat::Raw | PayloadFormat::Sealed => vec![(20 + i) as u8],
        })
        .collect()
}

async fn build_sender(config: &ProtocolConfig, battery_level: f64) -> Result<Sender, Box<dyn Error>> {
    config.validate()?;

    let link = UdpLink::connect("0.0.0.0:0", &config.target_address, config.loss_probability)
        .await?;

    let mut battery = Battery::new(
        config.initial_capacity,
        config.idle_drain_per_sec,
        config.tx_drain_base,
    );
    battery.force_level(battery_level);

    Ok(
        Sender::new(Box::new(link), config.build_codec()?, battery).with_base_timeout(
            Duration::from_millis(config.base_ack_timeout_ms),
        ),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Recv { listen, format } => {
            let config = ProtocolConfig::new()
                .with_listen_address(&listen)
                .with_payload_format(format);
            config.validate()?;

            let (delivery_tx, mut delivery_rx) = mpsc::channel(64);
            let (receiver, _handle) =
                Receiver::bind(&config.listen_address, config.build_codec()?, delivery_tx).await?;

            tokio::spawn(async move {
                while let Some(delivery) = delivery_rx.recv().await {
                    let readings: Vec<String> = delivery
                        .readings
                        .iter()
                        .map(|r| String::from_utf8_lossy(r).into_owned())
                        .collect();
                    info!(
                        sequence = delivery.sequence,
                        budget = delivery.budget,
                        ?readings,
                        "delivered"
                    );
                }
            });

            let stats = receiver.run().await;
            info!(?stats, "receiver finished");
        }

        Command::Send {
            target,
            count,
            battery,
            format,
            loss,
        } => {
            let config = ProtocolConfig::new()
                .with_target_address(&target)
                .with_payload_format(format)
                .with_loss_probability(loss);

            let mut sender = build_sender(&config, battery).await?;
            let readings = synthetic_readings(count, format);
            let interval = Duration::from_millis(config.reading_interval_ms);

            match sender.run(readings, interval).await {
                Ok(()) => {}
                // A dead battery ends the run; it is not a process failure
                Err(SenderError::BatteryDepleted) => info!("battery depleted, run ended early"),
                Err(e) => return Err(e.into()),
            }
            info!(stats = ?sender.stats(), "sender finished");
        }

        Command::Bench {
            count,
            battery,
            format,
        } => {
            let config = ProtocolConfig::new()
                .with_listen_address("127.0.0.1:0")
                .with_payload_format(format);
            config.validate()?;

            let (delivery_tx, mut delivery_rx) = mpsc::channel(64);
            let (receiver, handle) =
                Receiver::bind(&config.listen_address, config.build_codec()?, delivery_tx).await?;
            let addr = receiver
                .local_addr()
                .ok_or("receiver has no local address")?;
            let receiver_task = tokio::spawn(receiver.run());
            let counter_task = tokio::spawn(async move {
                let mut delivered = 0u64;
                while delivery_rx.recv().await.is_some() {
                    delivered += 1;
                }
                delivered
            });

            let config = config.with_target_address(&addr.to_string());
            let mut sender = build_sender(&config, battery).await?;
            match sender
                .run(synthetic_readings(count, format), Duration::ZERO)
                .await
            {
                Ok(()) => {}
                // The counters below are the whole point of the benchmark;
                // print them even when the battery dies mid-run
                Err(SenderError::BatteryDepleted) => info!("battery depleted, run ended early"),
                Err(e) => return Err(e.into()),
            }

            handle.stop().await;
            let receiver_stats = receiver_task.await?;
            let delivered = counter_task.await?;

            let stats = sender.stats();
            println!("readings fed:      {}", count);
            println!("packets sent:      {}", stats.packets_sent);
            println!("total bytes:       {}", stats.total_bytes);
            println!("flushes acked:     {}", stats.flushes_acked);
            println!("flushes exhausted: {}", stats.flushes_exhausted);
            println!("delivered batches: {}", delivered);
            println!("receiver stats:    {:?}", receiver_stats);
        }
    }

    Ok(())
}
