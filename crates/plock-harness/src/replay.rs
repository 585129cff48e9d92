#![forbid(unsafe_code)]

//! Pointer trace recording and replay.
//!
//! Records surface input (pointer contacts, resizes, origin measurements,
//! focus changes, ticks) with millisecond timestamps to JSONL, optionally
//! gzip-compressed. [`TraceReplayer`] reads the trace back and feeds steps in
//! recorded order; [`replay_gate`] drives a [`LockGate`] with them.
//!
//! # Format
//!
//! Each line is a JSON object with `{event, ts_ms, ...payload}`. The first
//! line may be a `trace_header`, the last a `trace_summary`; both are
//! optional so hand-written traces stay short:
//!
//! ```json
//! {"event":"trace_header","schema_version":"plock-trace-v1","session_name":"demo","surface_width":360.0}
//! {"event":"pointer","ts_ms":0,"kind":"down","x":80.0,"y":80.0}
//! {"event":"pointer","ts_ms":16,"kind":"move","x":180.0,"y":80.0,"frame":"local"}
//! {"event":"tick","ts_ms":900}
//! ```

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use plock_core::{CoordinateFrame, Event, PointerEvent, PointerEventKind};
use plock_gate::{GateEvent, LockGate, UnlockPredicate};
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

use crate::error::{ReplayError, Result};

// ---------------------------------------------------------------------------
// Schema version
// ---------------------------------------------------------------------------

/// Current schema version for trace files.
pub const SCHEMA_VERSION: &str = "plock-trace-v1";

// ---------------------------------------------------------------------------
// Serializable trace records
// ---------------------------------------------------------------------------

/// A single record in a trace JSONL file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum TraceRecord {
    /// Header record (first line).
    #[serde(rename = "trace_header")]
    Header {
        schema_version: String,
        session_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        surface_width: Option<f32>,
    },

    /// Pointer contact event.
    #[serde(rename = "pointer")]
    Pointer {
        ts_ms: u64,
        kind: PointerEventKind,
        x: f32,
        y: f32,
        #[serde(default)]
        frame: CoordinateFrame,
    },

    /// Surface resize.
    #[serde(rename = "resize")]
    Resize { ts_ms: u64, width: f32 },

    /// Surface origin measured.
    #[serde(rename = "surface_moved")]
    SurfaceMoved { ts_ms: u64, x: f32, y: f32 },

    /// Focus gained or lost.
    #[serde(rename = "focus")]
    Focus { ts_ms: u64, gained: bool },

    /// Timer tick with no input.
    #[serde(rename = "tick")]
    Tick { ts_ms: u64 },

    /// Summary record (last line).
    #[serde(rename = "trace_summary")]
    Summary {
        total_events: u64,
        total_duration_ms: u64,
    },
}

/// One replayable step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceStep {
    Input(Event),
    Tick,
}

impl TraceRecord {
    /// Convert an [`Event`] to a record.
    pub fn from_event(event: &Event, ts_ms: u64) -> Self {
        match *event {
            Event::Pointer(PointerEvent { kind, x, y, frame }) => Self::Pointer {
                ts_ms,
                kind,
                x,
                y,
                frame,
            },
            Event::Resize { width } => Self::Resize { ts_ms, width },
            Event::SurfaceMoved { x, y } => Self::SurfaceMoved { ts_ms, x, y },
            Event::Focus(gained) => Self::Focus { ts_ms, gained },
        }
    }

    /// The replayable step, if this is not a header or summary.
    pub fn to_step(&self) -> Option<TraceStep> {
        let event = match *self {
            Self::Pointer {
                kind, x, y, frame, ..
            } => Event::Pointer(PointerEvent { kind, x, y, frame }),
            Self::Resize { width, .. } => Event::Resize { width },
            Self::SurfaceMoved { x, y, .. } => Event::SurfaceMoved { x, y },
            Self::Focus { gained, .. } => Event::Focus(gained),
            Self::Tick { .. } => return Some(TraceStep::Tick),
            Self::Header { .. } | Self::Summary { .. } => return None,
        };
        Some(TraceStep::Input(event))
    }

    /// Timestamp, if this record carries one.
    pub fn ts_ms(&self) -> Option<u64> {
        match self {
            Self::Pointer { ts_ms, .. }
            | Self::Resize { ts_ms, .. }
            | Self::SurfaceMoved { ts_ms, .. }
            | Self::Focus { ts_ms, .. }
            | Self::Tick { ts_ms } => Some(*ts_ms),
            Self::Header { .. } | Self::Summary { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceWriter
// ---------------------------------------------------------------------------

/// Writes trace records as JSONL (optionally gzip-compressed).
pub struct TraceWriter<W: Write> {
    writer: BufWriter<W>,
    event_count: u64,
    first_ts_ms: Option<u64>,
    last_ts_ms: u64,
}

impl TraceWriter<std::fs::File> {
    /// Create a writer for an uncompressed JSONL file.
    pub fn plain(
        path: impl AsRef<Path>,
        session_name: &str,
        surface_width: Option<f32>,
    ) -> io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Self::from_writer(file, session_name, surface_width)
    }
}

impl TraceWriter<flate2::write::GzEncoder<std::fs::File>> {
    /// Create a writer for a gzip-compressed JSONL file.
    pub fn gzip(
        path: impl AsRef<Path>,
        session_name: &str,
        surface_width: Option<f32>,
    ) -> io::Result<Self> {
        let file = std::fs::File::create(path)?;
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
        Self::from_writer(encoder, session_name, surface_width)
    }
}

impl<W: Write> TraceWriter<W> {
    /// Wrap any writer and emit the header.
    pub fn from_writer(
        writer: W,
        session_name: &str,
        surface_width: Option<f32>,
    ) -> io::Result<Self> {
        let mut this = Self {
            writer: BufWriter::new(writer),
            event_count: 0,
            first_ts_ms: None,
            last_ts_ms: 0,
        };
        this.write_record(&TraceRecord::Header {
            schema_version: SCHEMA_VERSION.to_string(),
            session_name: session_name.to_string(),
            surface_width,
        })?;
        Ok(this)
    }

    /// Record an input event.
    pub fn record(&mut self, event: &Event, ts_ms: u64) -> io::Result<()> {
        self.write_record(&TraceRecord::from_event(event, ts_ms))
    }

    /// Record a timer tick.
    pub fn record_tick(&mut self, ts_ms: u64) -> io::Result<()> {
        self.write_record(&TraceRecord::Tick { ts_ms })
    }

    /// Write any trace record.
    pub fn write_record(&mut self, record: &TraceRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;

        if let Some(ts) = record.ts_ms() {
            self.first_ts_ms.get_or_insert(ts);
            self.last_ts_ms = ts;
            self.event_count += 1;
        }
        Ok(())
    }

    #[inline]
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Write the summary and flush, returning the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        let total_duration_ms = self
            .first_ts_ms
            .map_or(0, |first| self.last_ts_ms.saturating_sub(first));
        let summary = TraceRecord::Summary {
            total_events: self.event_count,
            total_duration_ms,
        };
        serde_json::to_writer(&mut self.writer, &summary).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TraceFile: parsed JSONL (gzip or plain)
// ---------------------------------------------------------------------------

/// A parsed trace.
#[derive(Debug, Clone)]
pub struct TraceFile {
    records: Vec<TraceRecord>,
}

impl TraceFile {
    /// Read and parse a trace file, detecting gzip by its magic bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| ReplayError::io(path, err))?;
        Self::from_bytes(&data)
    }

    /// Parse trace records from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let text = if data.starts_with(&[0x1f, 0x8b]) {
            let mut buf = Vec::new();
            flate2::read::GzDecoder::new(data).read_to_end(&mut buf)?;
            buf
        } else {
            data.to_vec()
        };

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(text.as_slice()).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord =
                serde_json::from_str(&line).map_err(|source| ReplayError::Record {
                    line: line_no + 1,
                    source,
                })?;
            if let TraceRecord::Header { schema_version, .. } = &record
                && schema_version != SCHEMA_VERSION
            {
                return Err(ReplayError::Schema {
                    found: schema_version.clone(),
                    expected: SCHEMA_VERSION,
                });
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    #[inline]
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Surface width recorded in the header, if any.
    #[must_use]
    pub fn surface_width(&self) -> Option<f32> {
        match self.records.first()? {
            TraceRecord::Header { surface_width, .. } => *surface_width,
            _ => None,
        }
    }

    /// Replayable steps with timestamps.
    pub fn steps(&self) -> Vec<(TraceStep, u64)> {
        self.records
            .iter()
            .filter_map(|r| Some((r.to_step()?, r.ts_ms()?)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TraceReplayer
// ---------------------------------------------------------------------------

/// Yields trace steps in recorded order.
///
/// The caller decides whether to honor the timing or fast-forward.
pub struct TraceReplayer {
    steps: Vec<(TraceStep, u64)>,
    position: usize,
}

impl TraceReplayer {
    #[must_use]
    pub fn new(steps: Vec<(TraceStep, u64)>) -> Self {
        Self { steps, position: 0 }
    }

    #[must_use]
    pub fn from_trace(trace: &TraceFile) -> Self {
        Self::new(trace.steps())
    }

    /// Next step with its timestamp, or `None` when exhausted.
    pub fn next_step(&mut self) -> Option<(TraceStep, u64)> {
        let step = *self.steps.get(self.position)?;
        self.position += 1;
        Some(step)
    }

    #[must_use]
    pub fn peek(&self) -> Option<&(TraceStep, u64)> {
        self.steps.get(self.position)
    }

    /// Consume all steps due at or before `until_ms`.
    pub fn advance_until(&mut self, until_ms: u64) -> Vec<TraceStep> {
        let mut out = Vec::new();
        while let Some(&(step, ts)) = self.peek() {
            if ts > until_ms {
                break;
            }
            self.position += 1;
            out.push(step);
        }
        out
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.position >= self.steps.len()
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.steps.len()
    }
}

// ---------------------------------------------------------------------------
// Driving a gate
// ---------------------------------------------------------------------------

/// A gate event stamped with the trace time that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayOutput {
    pub ts_ms: u64,
    #[serde(flatten)]
    pub event: GateEvent,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Replay every step through `gate`, with trace time 0 mapped to `epoch`.
///
/// `settle_ms`, if set, adds a final tick that long after the last step so
/// trailing cooldowns and lockouts resolve.
pub fn replay_gate<P: UnlockPredicate>(
    gate: &mut LockGate<P>,
    replayer: &mut TraceReplayer,
    epoch: Instant,
    settle_ms: Option<u64>,
) -> Vec<ReplayOutput> {
    let mut outputs = Vec::new();
    let mut last_ts = 0;
    while let Some((step, ts_ms)) = replayer.next_step() {
        let Some(now) = epoch.checked_add(Duration::from_millis(ts_ms)) else {
            tracing::warn!(ts_ms, "timestamp outside clock range, replay stopped");
            break;
        };
        last_ts = ts_ms;
        let events = match step {
            TraceStep::Input(event) => gate.handle(&event, now),
            TraceStep::Tick => gate.tick(now),
        };
        outputs.extend(events.into_iter().map(|event| stamp(event, ts_ms)));
    }

    let settle_at = settle_ms.map(|settle| last_ts.saturating_add(settle));
    if let Some(ts_ms) = settle_at
        && let Some(now) = epoch.checked_add(Duration::from_millis(ts_ms))
    {
        let events = gate.tick(now);
        outputs.extend(events.into_iter().map(|event| stamp(event, ts_ms)));
    }

    tracing::debug!(
        steps = replayer.position(),
        outputs = outputs.len(),
        "trace replayed"
    );
    outputs
}

fn stamp(event: GateEvent, ts_ms: u64) -> ReplayOutput {
    ReplayOutput {
        ts_ms,
        message: event.to_string(),
        event,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
