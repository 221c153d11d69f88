// src/device/sim.rs
// In-memory heat pump used by the test-suite and the bundled binary

use chrono::{Datelike, Local, NaiveDateTime, TimeDelta, Timelike};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

use super::catalog::ParamCatalog;
use super::types::{FaultEntry, TimeProgEntry, TimeProgram};
use super::value::ParamValue;
use super::HeatPump;
use crate::error::{HtError, Result};

#[derive(Debug, Default)]
struct ProbeState {
    logins: AtomicUsize,
    logouts: AtomicUsize,
    writes: AtomicUsize,
    logged_in: AtomicBool,
    transport_dropped: AtomicBool,
    failing_logins: AtomicUsize,
    failing_logouts: AtomicBool,
}

/// Shared handle for observing and disturbing a `SimulatedHeatPump`
/// after it has been moved into a session.
#[derive(Debug, Clone, Default)]
pub struct SimProbe {
    state: Arc<ProbeState>,
}

impl SimProbe {
    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.state.logouts.load(Ordering::SeqCst)
    }

    /// Number of calls that changed device state
    pub fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.logged_in.load(Ordering::SeqCst)
    }

    /// Simulate a lost serial line; the next `open_connection` restores it
    pub fn drop_transport(&self) {
        self.state.transport_dropped.store(true, Ordering::SeqCst);
    }

    /// Make the next `count` login attempts fail
    pub fn fail_logins(&self, count: usize) {
        self.state.failing_logins.store(count, Ordering::SeqCst);
    }

    pub fn fail_logouts(&self, fail: bool) {
        self.state.failing_logouts.store(fail, Ordering::SeqCst);
    }
}

pub struct SimulatedHeatPump {
    catalog: ParamCatalog,
    values: BTreeMap<String, ParamValue>,
    overwrites: BTreeMap<String, ParamValue>,
    clock_offset: TimeDelta,
    faults: Vec<FaultEntry>,
    time_progs: Vec<TimeProgram>,
    serial_number: u32,
    version: (String, u32),
    port: String,
    baudrate: u32,
    open: bool,
    probe: SimProbe,
}

fn truncate_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

fn default_faults() -> Vec<FaultEntry> {
    let now = truncate_seconds(Local::now().naive_local());
    [
        (20, "EQ_Spreizung", 40),
        (65, "Hochdruck", 12),
        (20, "EQ_Spreizung", 2),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (error, message, days_ago))| FaultEntry {
        index,
        error,
        datetime: now - TimeDelta::days(days_ago),
        message: message.to_string(),
    })
    .collect()
}

fn default_time_progs() -> Vec<TimeProgram> {
    vec![
        TimeProgram::blank(0, "Warmwasser", 7, 3, 15, 7),
        TimeProgram::blank(1, "Zirkulationspumpe", 7, 2, 15, 7),
        TimeProgram::blank(2, "Heizung", 7, 3, 15, 7),
    ]
}

impl SimulatedHeatPump {
    pub fn new(catalog: ParamCatalog) -> Self {
        let values = catalog
            .iter()
            .map(|def| (def.name.clone(), def.initial_value()))
            .collect();
        Self {
            catalog,
            values,
            overwrites: BTreeMap::new(),
            clock_offset: TimeDelta::zero(),
            faults: default_faults(),
            time_progs: default_time_progs(),
            serial_number: 123_456,
            version: ("3.0.20".to_string(), 2321),
            port: "simulated".to_string(),
            baudrate: 115_200,
            open: false,
            probe: SimProbe::default(),
        }
    }

    pub fn with_value(mut self, name: &str, value: ParamValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Serial port and baud rate the simulation stands in for
    pub fn with_transport(mut self, port: &str, baudrate: u32) -> Self {
        self.port = port.to_string();
        self.baudrate = baudrate;
        self
    }

    pub fn transport(&self) -> (&str, u32) {
        (self.port.as_str(), self.baudrate)
    }

    pub fn with_faults(mut self, faults: Vec<FaultEntry>) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_time_progs(mut self, time_progs: Vec<TimeProgram>) -> Self {
        self.time_progs = time_progs;
        self
    }

    pub fn probe(&self) -> SimProbe {
        self.probe.clone()
    }

    fn transport_up(&self) -> bool {
        self.open && !self.probe.state.transport_dropped.load(Ordering::SeqCst)
    }

    fn ensure_logged_in(&self) -> Result<()> {
        if !self.transport_up() {
            return Err(HtError::Connectivity("serial connection not established".to_string()));
        }
        if !self.probe.is_logged_in() {
            return Err(HtError::Device("not logged in".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.probe.state.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn known_value(&self, name: &str) -> Result<ParamValue> {
        let def = self
            .catalog
            .get(name)
            .ok_or_else(|| HtError::Device(format!("unknown data point '{name}'")))?;
        Ok(self
            .overwrites
            .get(name)
            .or_else(|| self.values.get(name))
            .copied()
            .unwrap_or_else(|| def.initial_value()))
    }

    fn check_type(&self, name: &str, value: &ParamValue) -> Result<()> {
        let def = self
            .catalog
            .get(name)
            .ok_or_else(|| HtError::Device(format!("unknown data point '{name}'")))?;
        if def.data_type != value.data_type() {
            return Err(HtError::Device(format!(
                "data point '{name}' expects {:?}",
                def.data_type
            )));
        }
        Ok(())
    }

    fn time_prog(&self, index: usize) -> Result<&TimeProgram> {
        self.time_progs
            .get(index)
            .ok_or_else(|| HtError::Device(format!("time program index {index} out of range")))
    }

    fn stored_entries(prog: &TimeProgram) -> Result<&Vec<Vec<TimeProgEntry>>> {
        prog.entries
            .as_ref()
            .ok_or_else(|| HtError::Device(format!("time program #{} has no entries", prog.index)))
    }

    fn clock(&self) -> (NaiveDateTime, u8) {
        let dt = truncate_seconds(Local::now().naive_local() + self.clock_offset);
        (dt, dt.weekday().number_from_monday() as u8)
    }
}

impl HeatPump for SimulatedHeatPump {
    fn open_connection(&mut self) -> Result<()> {
        self.open = true;
        self.probe.state.transport_dropped.store(false, Ordering::SeqCst);
        debug!(
            "Simulated serial connection opened (standing in for {} at {} baud)",
            self.port, self.baudrate
        );
        Ok(())
    }

    fn close_connection(&mut self) {
        self.open = false;
        self.probe.state.logged_in.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.transport_up()
    }

    fn login(&mut self) -> Result<()> {
        let failing = &self.probe.state.failing_logins;
        if failing.load(Ordering::SeqCst) > 0 {
            failing.fetch_sub(1, Ordering::SeqCst);
            return Err(HtError::Connectivity("login rejected".to_string()));
        }
        if !self.transport_up() {
            return Err(HtError::Connectivity("serial connection not established".to_string()));
        }
        self.probe.state.logged_in.store(true, Ordering::SeqCst);
        self.probe.state.logins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        self.probe.state.logged_in.store(false, Ordering::SeqCst);
        self.probe.state.logouts.fetch_add(1, Ordering::SeqCst);
        if self.probe.state.failing_logouts.load(Ordering::SeqCst) {
            return Err(HtError::Device("logout not acknowledged".to_string()));
        }
        Ok(())
    }

    fn get_serial_number(&mut self) -> Result<u32> {
        self.ensure_logged_in()?;
        Ok(self.serial_number)
    }

    fn get_version(&mut self) -> Result<(String, u32)> {
        self.ensure_logged_in()?;
        Ok(self.version.clone())
    }

    fn get_date_time(&mut self) -> Result<(NaiveDateTime, u8)> {
        self.ensure_logged_in()?;
        Ok(self.clock())
    }

    fn set_date_time(&mut self, dt: NaiveDateTime) -> Result<(NaiveDateTime, u8)> {
        self.ensure_logged_in()?;
        self.clock_offset = truncate_seconds(dt) - Local::now().naive_local();
        self.record_write();
        Ok(self.clock())
    }

    fn get_param(&mut self, name: &str) -> Result<ParamValue> {
        self.ensure_logged_in()?;
        self.known_value(name)
    }

    fn set_param(&mut self, name: &str, value: ParamValue, verify: bool) -> Result<ParamValue> {
        self.ensure_logged_in()?;
        self.check_type(name, &value)?;
        if verify && let Some(def) = self.catalog.get(name) {
            def.verify(&value)?;
        }
        self.values.insert(name.to_string(), value);
        self.record_write();
        debug!(name, %value, "Simulated parameter write");
        if verify {
            let stored = self.values.get(name).copied();
            if stored != Some(value) {
                return Err(HtError::Device(format!(
                    "verification of data point '{name}' failed"
                )));
            }
        }
        Ok(value)
    }

    fn fast_query(&mut self, names: &[String]) -> Result<BTreeMap<String, ParamValue>> {
        self.ensure_logged_in()?;
        let mut result = BTreeMap::new();
        for name in names {
            match self.catalog.get(name) {
                Some(def) if def.is_fast_queryable() => {
                    result.insert(name.clone(), self.known_value(name)?);
                }
                _ => {
                    return Err(HtError::Device(format!(
                        "data point '{name}' is not an MP data point"
                    )));
                }
            }
        }
        Ok(result)
    }

    fn overwrite_param(
        &mut self,
        name: &str,
        value: Option<ParamValue>,
    ) -> Result<Option<ParamValue>> {
        self.ensure_logged_in()?;
        match value {
            Some(v) => {
                self.check_type(name, &v)?;
                self.overwrites.insert(name.to_string(), v);
            }
            None => {
                self.overwrites.remove(name);
            }
        }
        self.record_write();
        Ok(value)
    }

    fn get_fault_list_size(&mut self) -> Result<usize> {
        self.ensure_logged_in()?;
        Ok(self.faults.len())
    }

    fn get_fault_list(&mut self) -> Result<Vec<FaultEntry>> {
        self.ensure_logged_in()?;
        Ok(self.faults.clone())
    }

    fn get_fault_entry(&mut self, index: usize) -> Result<FaultEntry> {
        self.ensure_logged_in()?;
        self.faults
            .get(index)
            .cloned()
            .ok_or_else(|| HtError::Device(format!("fault list index {index} out of range")))
    }

    fn get_last_fault(&mut self) -> Result<Option<FaultEntry>> {
        self.ensure_logged_in()?;
        Ok(self.faults.last().cloned())
    }

    fn get_time_progs(&mut self) -> Result<Vec<TimeProgram>> {
        self.ensure_logged_in()?;
        Ok(self.time_progs.iter().map(TimeProgram::metadata).collect())
    }

    fn get_time_prog(&mut self, index: usize, with_entries: bool) -> Result<TimeProgram> {
        self.ensure_logged_in()?;
        let prog = self.time_prog(index)?;
        Ok(if with_entries {
            prog.clone()
        } else {
            prog.metadata()
        })
    }

    fn set_time_prog(&mut self, prog: &TimeProgram) -> Result<TimeProgram> {
        self.ensure_logged_in()?;
        let entries = Self::stored_entries(prog)?.clone();
        let updated = self.time_prog(prog.index)?.clone().with_entries(entries)?;
        self.time_progs[prog.index] = updated.clone();
        self.record_write();
        Ok(updated)
    }

    fn get_time_prog_entry(
        &mut self,
        index: usize,
        day: usize,
        num: usize,
    ) -> Result<TimeProgEntry> {
        self.ensure_logged_in()?;
        let prog = self.time_prog(index)?;
        prog.check_slot(day, num)?;
        Ok(Self::stored_entries(prog)?[day][num])
    }

    fn set_time_prog_entry(
        &mut self,
        index: usize,
        day: usize,
        num: usize,
        entry: TimeProgEntry,
    ) -> Result<TimeProgEntry> {
        self.ensure_logged_in()?;
        let prog = self.time_prog(index)?;
        prog.check_slot(day, num)?;
        prog.verify_entry(&entry)?;
        let (ead, nod) = (prog.ead, prog.nod);
        let slots = self.time_progs[index]
            .entries
            .get_or_insert_with(|| vec![vec![TimeProgEntry::default(); ead]; nod]);
        slots[day][num] = entry;
        self.record_write();
        Ok(entry)
    }
}
