//! Builds per-device testbed descriptor maps for network test automation.
//!
//! A [`TestbedMap`] stages loosely-typed field values for one device at a
//! time, validates each on assignment, and commits the staged fields into a
//! keyed collection of [`models::DeviceRecord`]s. The collection is written
//! out once as a JSON document whose top-level keys are switch IDs.
//!
//! ```no_run
//! use testbed_map::TestbedMap;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut map = TestbedMap::new();
//! map.set_sid("301")?;
//! map.set_hostname("tor-301");
//! map.set_mgmt_ip("172.29.167.208");
//! map.add_role("leaf")?;
//! map.add_role("vtep")?;
//! map.commit()?;
//!
//! map.set_output("vxlan.map.json");
//! map.save()?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod ingest;
pub mod models;
pub mod verify;

pub use builder::TestbedMap;
