//-------------------------------------------------------------------//
//          lemsim : electron avalanches in a LEM unit cell          //
//                            version 1.0                            //
//                        :) Share & enjoy :)                        //
//-------------------------------------------------------------------//
// Electron collision kinematics and argon cross sections follow     //
// eduPIC; when you use this code, please cite:                      //
// Z. Donko, A. Derzsi, M. Vass, B. Horvath, S. Wilczek              //
// B. Hartmann, P. Hartmann:                                         //
// "eduPIC: an introductory particle based code for radio-frequency  //
// plasma simulation"                                                //
// Plasma Sources Science and Technology, vol 30, 095017 (2021)      //
//-------------------------------------------------------------------//
// This program is free software: you can redistribute it and/or     //
// modify it under the terms of the GNU General Public License as    //
// published by the Free Software Foundation, version 3.             //
// This program is distributed in the hope that it will be useful,   //
// but WITHOUT ANY WARRANTY; without even the implied warranty of    //
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU  //
// General Public License for more details at                        //
// https://www.gnu.org/licenses/gpl-3.0.html.                        //
//-------------------------------------------------------------------//

//! Persistent event store.
//!
//! A store file starts with an eight byte magic followed by a bincode
//! stream: one [`TreeHeader`], one
//! [`Record::Row`] per accepted avalanche and a closing [`Record::End`]
//! carrying the number of rows. A file without the closing record was not
//! finalized and is reported as truncated when read.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::avalanche::AvalancheEvent;
use crate::error::StoreError;

const MAGIC: &[u8; 8] = b"LEMTREE\0";
const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Int,
    IntArray,
    FloatArray,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Leading record of every store file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeHeader {
    pub version: u32,
    pub name: String,
    pub title: String,
    pub columns: Vec<ColumnSpec>,
}

impl TreeHeader {
    pub fn new(name: &str, title: &str) -> Self {
        let column = |name: &str, kind| ColumnSpec { name: name.to_string(), kind };
        let mut columns = vec![
            column("nele", ColumnKind::Int),
            column("nelep", ColumnKind::Int),
            column("status", ColumnKind::IntArray),
        ];
        for name in &["x0", "y0", "z0", "e0", "t0", "x1", "y1", "z1", "e1", "t1"] {
            columns.push(column(name, ColumnKind::FloatArray));
        }
        Self {
            version: FORMAT_VERSION,
            name: name.to_string(),
            title: title.to_string(),
            columns,
        }
    }
}

/// One stored avalanche. Every array holds `nelep` entries in engine
/// enumeration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub nele: i32,
    pub nelep: i32,
    pub status: Vec<i32>,
    pub x0: Vec<f64>,
    pub y0: Vec<f64>,
    pub z0: Vec<f64>,
    pub e0: Vec<f64>,
    pub t0: Vec<f64>,
    pub x1: Vec<f64>,
    pub y1: Vec<f64>,
    pub z1: Vec<f64>,
    pub e1: Vec<f64>,
    pub t1: Vec<f64>,
}

impl From<&AvalancheEvent> for EventRow {
    fn from(event: &AvalancheEvent) -> Self {
        let n = event.endpoint_count();
        let mut row = EventRow {
            nele: event.electron_count,
            nelep: n as i32,
            status: Vec::with_capacity(n),
            x0: Vec::with_capacity(n),
            y0: Vec::with_capacity(n),
            z0: Vec::with_capacity(n),
            e0: Vec::with_capacity(n),
            t0: Vec::with_capacity(n),
            x1: Vec::with_capacity(n),
            y1: Vec::with_capacity(n),
            z1: Vec::with_capacity(n),
            e1: Vec::with_capacity(n),
            t1: Vec::with_capacity(n),
        };
        for e in &event.endpoints {
            row.status.push(e.status);
            row.x0.push(e.x0);
            row.y0.push(e.y0);
            row.z0.push(e.z0);
            row.e0.push(e.e0);
            row.t0.push(e.t0);
            row.x1.push(e.x1);
            row.y1.push(e.y1);
            row.z1.push(e.z1);
            row.e1.push(e.e1);
            row.t1.push(e.t1);
        }
        row
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Row(EventRow),
    End { entries: u64 },
}

/// Destination of accepted avalanches.
pub trait EventSink {
    fn append(&mut self, event: &AvalancheEvent) -> Result<(), StoreError>;
}

impl EventSink for Vec<EventRow> {
    fn append(&mut self, event: &AvalancheEvent) -> Result<(), StoreError> {
        self.push(EventRow::from(event));
        Ok(())
    }
}

/// Writes an event store. Closing writes the trailer; a writer dropped
/// without [`TreeWriter::close`] is closed on a best-effort basis.
#[derive(Debug)]
pub struct TreeWriter {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    entries: u64,
}

impl TreeWriter {
    /// Creates (or replaces) the store at `path` and writes its header.
    pub fn create(path: &Path, name: &str, title: &str) -> Result<Self, StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let mut file = BufWriter::new(file);
        file.write_all(MAGIC).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        bincode::serialize_into(&mut file, &TreeHeader::new(name, title))?;
        info!(path = %path.display(), tree = name, "event store opened");
        Ok(Self { path: path.to_path_buf(), file: Some(file), entries: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn fill(&mut self, row: &EventRow) -> Result<(), StoreError> {
        let file = self.file.as_mut().ok_or(StoreError::Closed)?;
        bincode::serialize_into(file, &Record::Row(row.clone()))?;
        self.entries += 1;
        Ok(())
    }

    /// Writes the trailer and flushes. Returns the number of rows.
    pub fn close(&mut self) -> Result<u64, StoreError> {
        let mut file = self.file.take().ok_or(StoreError::Closed)?;
        bincode::serialize_into(&mut file, &Record::End { entries: self.entries })?;
        file.flush().map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        info!(path = %self.path.display(), entries = self.entries, "event store closed");
        Ok(self.entries)
    }
}

impl EventSink for TreeWriter {
    fn append(&mut self, event: &AvalancheEvent) -> Result<(), StoreError> {
        self.fill(&EventRow::from(event))
    }
}

impl Drop for TreeWriter {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(err) = self.close() {
                warn!(path = %self.path.display(), error = %err, "event store could not be finalized");
            }
        }
    }
}

/// Reads a finalized event store row by row.
#[derive(Debug)]
pub struct TreeReader {
    path: PathBuf,
    header: TreeHeader,
    file: BufReader<File>,
    rows: u64,
    done: bool,
}

impl TreeReader {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let mut file = BufReader::new(file);
        let mut magic = [0u8; 8];
        if file.read_exact(&mut magic).is_err() || &magic != MAGIC {
            return Err(StoreError::BadHeader { path: path.to_path_buf() });
        }
        let header: TreeHeader = bincode::deserialize_from(&mut file)
            .map_err(|_| StoreError::BadHeader { path: path.to_path_buf() })?;
        if header.version != FORMAT_VERSION {
            return Err(StoreError::BadHeader { path: path.to_path_buf() });
        }
        Ok(Self { path: path.to_path_buf(), header, file, rows: 0, done: false })
    }

    pub fn header(&self) -> &TreeHeader {
        &self.header
    }

    /// Reads every remaining row.
    pub fn read_all(self) -> Result<Vec<EventRow>, StoreError> {
        self.collect()
    }

    fn truncated(&mut self) -> StoreError {
        self.done = true;
        StoreError::Truncated { path: self.path.clone(), rows: self.rows }
    }
}

impl Iterator for TreeReader {
    type Item = Result<EventRow, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match bincode::deserialize_from::<_, Record>(&mut self.file) {
            Ok(Record::Row(row)) => {
                self.rows += 1;
                Some(Ok(row))
            }
            Ok(Record::End { entries }) => {
                if entries != self.rows {
                    return Some(Err(self.truncated()));
                }
                self.done = true;
                None
            }
            Err(err) => {
                let eof = matches!(&*err, bincode::ErrorKind::Io(io) if io.kind() == ErrorKind::UnexpectedEof);
                if eof {
                    Some(Err(self.truncated()))
                } else {
                    self.done = true;
                    Some(Err(StoreError::Encoding(err)))
                }
            }
        }
    }
}
