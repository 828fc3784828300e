//! Parallel batch execution.
//!
//! A leased batch is split into contiguous chunks, one per execution unit.
//! Units are strictly CPU-bound: no I/O, no allocation beyond the trial
//! itself. A shared found-flag cancels peers cooperatively; a unit may finish
//! its current trial after the flag is raised but never starts another one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use secp256k1::{All, Secp256k1};

use distributed_cracker::wallet::{verify_candidate, WalletDescriptor};

const PROGRESS_EVERY: usize = 1000;

/// Runs the batch across `units` threads. Returns the matching passphrase if
/// any unit finds one.
pub fn run_batch(passwords: &[String], wallet: &WalletDescriptor, units: usize) -> Option<String> {
    if passwords.is_empty() {
        return None;
    }

    let units = units.max(1).min(passwords.len());
    let chunk_len = passwords.len().div_ceil(units);

    let found = Arc::new(AtomicBool::new(false));
    let winner: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let mut handles = Vec::with_capacity(units);
    for (unit_id, chunk) in passwords.chunks(chunk_len).enumerate() {
        let chunk = chunk.to_vec();
        let wallet = wallet.clone();
        let found = Arc::clone(&found);
        let winner = Arc::clone(&winner);

        handles.push(std::thread::spawn(move || {
            run_unit(unit_id, &chunk, &wallet, &found, &winner);
        }));
    }

    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("Execution unit panicked");
        }
    }

    let result = winner
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone();
    result
}

fn run_unit(
    unit_id: usize,
    chunk: &[String],
    wallet: &WalletDescriptor,
    found: &AtomicBool,
    winner: &Mutex<Option<String>>,
) {
    let secp: Secp256k1<All> = Secp256k1::new();

    for (trials, password) in chunk.iter().enumerate() {
        if found.load(Ordering::Relaxed) {
            return;
        }

        if verify_candidate(&secp, password, wallet) {
            tracing::info!("Unit {} matched a candidate", unit_id);
            *winner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(password.clone());
            found.store(true, Ordering::Relaxed);
            return;
        }

        if (trials + 1) % PROGRESS_EVERY == 0 {
            tracing::info!("Unit {} tried {} candidates", unit_id, trials + 1);
        }
    }
}
