// ecolink - Energy-aware datagram transport for battery-powered sensor nodes
//
// A sender that adapts its batching and retry aggressiveness to its simulated
// remaining energy, and a receiver that deduplicates and acknowledges
// deliveries. Module map:
// - packet:   6-byte wire header codec + payload codecs (text/binary/sealed)
// - crypto:   authenticated payload encryption under a pre-shared key
// - battery:  deterministic energy simulation (idle drain + transmit cost)
// - strategy: battery level -> (batch threshold, mode, retry budget)
// - link:     datagram link abstraction, UDP implementation, loss simulation
// - sender:   buffering / flush / retry state machine
// - receiver: dedup + ACK loop
// - config:   plain configuration surface for all of the above

pub mod battery;
pub mod config;
pub mod crypto;
pub mod link;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod strategy;
