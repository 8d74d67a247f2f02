// src/engine.rs
//
// Background fetch plumbing. One worker thread pulls jobs off a channel, runs
// them against the shared transport, and pushes tagged outcomes back. Jobs run
// strictly in submission order; the tag on each outcome is what lets the
// apply side recognize completions for interests that have since moved on.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::clients::cashflow::{self, CashflowSnapshot, DayWindow};
use crate::clients::market::{self, Listing};
use crate::clients::warehouse::{self, RawResource};
use crate::clients::{auth, auth::AuthData};
use crate::net::{NetError, Transport};

/// One unit of network work, tagged with everything `apply` needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Auth,
    Inventory { company_id: i64 },
    Market { realm: i32, product: u32 },
    ProductionPrices { realm: i32, product: u32, ids: Vec<u32> },
    Cashflow { window: DayWindow },
}

/// A completed job. Tags are echoed back verbatim.
#[derive(Debug)]
pub enum Outcome {
    Auth(Result<AuthData, NetError>),
    Inventory(Result<Vec<RawResource>, NetError>),
    Market {
        realm: i32,
        product: u32,
        result: Result<Vec<Listing>, NetError>,
    },
    ProductionPrices {
        realm: i32,
        product: u32,
        result: Result<Vec<(u32, Vec<Listing>)>, NetError>,
    },
    Cashflow(Result<CashflowSnapshot, NetError>),
}

pub fn run_job(job: Job, transport: &dyn Transport) -> Outcome {
    match job {
        Job::Auth => Outcome::Auth(auth::run(transport)),
        Job::Inventory { company_id } => Outcome::Inventory(warehouse::run(transport, company_id)),
        Job::Market { realm, product } => Outcome::Market {
            realm,
            product,
            result: market::run(transport, realm, product),
        },
        Job::ProductionPrices { realm, product, ids } => Outcome::ProductionPrices {
            realm,
            product,
            result: market::run_production_prices(transport, realm, &ids),
        },
        Job::Cashflow { window } => Outcome::Cashflow(cashflow::run(transport, window)),
    }
}

/// Handle to the worker thread. Dropping it closes the job channel and the
/// thread exits on its own.
pub struct FetchWorker {
    job_tx: Sender<Job>,
    outcome_rx: Receiver<Outcome>,
}

impl FetchWorker {
    pub fn spawn(transport: Arc<dyn Transport>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<Outcome>();

        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                debug!("Worker: running {job:?}");
                let outcome = run_job(job, transport.as_ref());
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        });

        Self { job_tx, outcome_rx }
    }

    pub fn submit(&self, job: Job) {
        // send only fails when the worker is gone, which means shutdown
        let _ = self.job_tx.send(job);
    }

    /// All outcomes that have landed since the last drain, without blocking.
    pub fn drain(&self) -> Vec<Outcome> {
        let mut out = Vec::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => out.push(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned;
    impl Transport for Canned {
        fn get(&self, url: &str) -> Result<String, NetError> {
            if url.contains("auth-data") {
                Ok(r#"{"authCompany":{"companyId":1,"realmId":0}}"#.into())
            } else {
                Err(NetError::Status(404))
            }
        }
    }

    #[test]
    fn worker_runs_jobs_in_order() {
        let worker = FetchWorker::spawn(Arc::new(Canned));
        worker.submit(Job::Auth);
        worker.submit(Job::Inventory { company_id: 1 });

        let mut got = Vec::new();
        while got.len() < 2 {
            got.extend(worker.drain());
            thread::yield_now();
        }
        assert!(matches!(got[0], Outcome::Auth(Ok(_))));
        assert!(matches!(got[1], Outcome::Inventory(Err(_))));
    }
}
