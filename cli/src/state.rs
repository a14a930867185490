//! Persisted protocol state: the stake ledger and the directory, loaded from
//! and saved to a file snapshot store.

use anyhow::Context;
use std::path::Path;
use sylo_directory::Directory;
use sylo_staking::StakeLedger;
use sylo_store::FileSnapshotStore;
use sylo_types::{Address, StakingParams};
use tracing::{debug, info};

pub struct State {
    store: FileSnapshotStore,
    pub ledger: StakeLedger,
    pub directory: Directory,
}

impl State {
    /// Load the snapshots under `data_dir`. A missing ledger snapshot starts
    /// a fresh ledger administered by `admin` with `params`; an existing one
    /// keeps its persisted roles and parameters.
    pub fn open(
        data_dir: impl AsRef<Path>,
        admin: Address,
        params: StakingParams,
    ) -> anyhow::Result<Self> {
        let data_dir = data_dir.as_ref();
        let store = FileSnapshotStore::open(data_dir)
            .with_context(|| format!("opening data dir {}", data_dir.display()))?;

        let ledger = match StakeLedger::load_from_store(&store).context("loading stake ledger")? {
            Some(ledger) => {
                debug!(nodes = ledger.nodes().len(), "loaded stake ledger");
                ledger
            }
            None => {
                info!(admin = %admin, dir = %data_dir.display(), "initialising new stake ledger");
                StakeLedger::new(admin, params)?
            }
        };
        let directory = Directory::load_from_store(&store).context("loading directory")?;

        Ok(Self {
            store,
            ledger,
            directory,
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.ledger
            .save_to_store(&self.store)
            .context("saving stake ledger")?;
        self.directory
            .save_to_store(&self.store)
            .context("saving directory")?;
        debug!(dir = %self.store.dir().display(), "state saved");
        Ok(())
    }
}
