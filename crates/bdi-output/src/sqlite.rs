//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `agent_metrics` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentMetricsRow, OutputResult, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_metrics (
                 agent_id          INTEGER NOT NULL,
                 tick              INTEGER NOT NULL,
                 active_intentions INTEGER NOT NULL,
                 desire_count      INTEGER NOT NULL,
                 social_battery    REAL NOT NULL,
                 happiness         REAL NOT NULL,
                 loneliness        REAL NOT NULL,
                 in_conversation   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick               INTEGER PRIMARY KEY,
                 unix_time_secs     INTEGER NOT NULL,
                 agents_run         INTEGER NOT NULL,
                 actions_dispatched INTEGER NOT NULL,
                 force_quits        INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_metrics(&mut self, rows: &[AgentMetricsRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_metrics \
                 (agent_id, tick, active_intentions, desire_count, social_battery, \
                  happiness, loneliness, in_conversation) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick,
                    row.active_intentions,
                    row.desire_count,
                    row.social_battery,
                    row.happiness,
                    row.loneliness,
                    row.in_conversation as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, unix_time_secs, agents_run, actions_dispatched, force_quits) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                row.tick,
                row.unix_time_secs,
                row.agents_run,
                row.actions_dispatched,
                row.force_quits,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
