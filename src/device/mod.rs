// src/device/mod.rs
// Heat pump driver contract and the data it exchanges

pub mod catalog;
pub mod sim;
pub mod types;
pub mod value;

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::error::Result;

pub use catalog::{DpType, ParamCatalog, ParamDef};
pub use sim::{SimProbe, SimulatedHeatPump};
pub use types::{FaultEntry, TimeOfDay, TimeProgEntry, TimeProgram};
pub use value::{DataType, ParamValue};

/// Operations offered by a heat pump driver.
///
/// Calls are blocking and expect exclusive access to the transport. Apart
/// from the connection management methods, every call requires a prior
/// successful `login`; `DeviceSession` takes care of that bracket.
pub trait HeatPump: Send {
    fn open_connection(&mut self) -> Result<()>;
    fn close_connection(&mut self);
    fn is_open(&self) -> bool;
    fn login(&mut self) -> Result<()>;
    fn logout(&mut self) -> Result<()>;

    fn get_serial_number(&mut self) -> Result<u32>;
    /// Software version string and its numeric build
    fn get_version(&mut self) -> Result<(String, u32)>;

    /// Device clock and weekday (1 = Monday)
    fn get_date_time(&mut self) -> Result<(NaiveDateTime, u8)>;
    fn set_date_time(&mut self, dt: NaiveDateTime) -> Result<(NaiveDateTime, u8)>;

    fn get_param(&mut self, name: &str) -> Result<ParamValue>;
    /// Write a parameter; with `verify` the driver reads the value back
    fn set_param(&mut self, name: &str, value: ParamValue, verify: bool) -> Result<ParamValue>;
    /// Batched read of MP data points
    fn fast_query(&mut self, names: &[String]) -> Result<BTreeMap<String, ParamValue>>;
    /// Set (`Some`) or clear (`None`) the manual overwrite of a parameter
    fn overwrite_param(
        &mut self,
        name: &str,
        value: Option<ParamValue>,
    ) -> Result<Option<ParamValue>>;

    fn get_fault_list_size(&mut self) -> Result<usize>;
    fn get_fault_list(&mut self) -> Result<Vec<FaultEntry>>;
    fn get_fault_entry(&mut self, index: usize) -> Result<FaultEntry>;
    fn get_last_fault(&mut self) -> Result<Option<FaultEntry>>;

    /// Metadata of all time programs, without entries
    fn get_time_progs(&mut self) -> Result<Vec<TimeProgram>>;
    fn get_time_prog(&mut self, index: usize, with_entries: bool) -> Result<TimeProgram>;
    fn set_time_prog(&mut self, prog: &TimeProgram) -> Result<TimeProgram>;
    fn get_time_prog_entry(&mut self, index: usize, day: usize, num: usize)
    -> Result<TimeProgEntry>;
    fn set_time_prog_entry(
        &mut self,
        index: usize,
        day: usize,
        num: usize,
        entry: TimeProgEntry,
    ) -> Result<TimeProgEntry>;
}
