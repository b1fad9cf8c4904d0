//! Integration tests for bdi-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{AgentMetricsRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn metrics_row(agent_id: u32, tick: u64) -> AgentMetricsRow {
        AgentMetricsRow {
            agent_id,
            tick,
            active_intentions: 1,
            desire_count: 3,
            social_battery: 0.75,
            happiness: 0.6,
            loneliness: 0.1,
            in_conversation: agent_id % 2 == 0,
        }
    }

    fn summary_row(tick: u64) -> TickSummaryRow {
        TickSummaryRow {
            tick,
            unix_time_secs: tick as i64 * 5,
            agents_run: tick,
            actions_dispatched: tick,
            force_quits: 0,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_metrics.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_metrics.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            [
                "agent_id",
                "tick",
                "active_intentions",
                "desire_count",
                "social_battery",
                "happiness",
                "loneliness",
                "in_conversation",
            ]
        );

        let mut rdr2 = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers2,
            ["tick", "unix_time_secs", "agents_run", "actions_dispatched", "force_quits"]
        );
    }

    #[test]
    fn csv_metrics_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = vec![metrics_row(0, 5), metrics_row(1, 5), metrics_row(2, 5)];
        w.write_metrics(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_metrics.csv")).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 3);
        assert_eq!(&read_rows[0][0], "0"); // agent_id
        assert_eq!(&read_rows[0][1], "5"); // tick
        assert_eq!(&read_rows[1][0], "1");
        assert_eq!(&read_rows[2][0], "2");
    }

    #[test]
    fn csv_tick_summary_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(3)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 1);
        assert_eq!(&read_rows[0][0], "3"); // tick
        assert_eq!(&read_rows[0][1], "15"); // 3 * 5
        assert_eq!(&read_rows[0][2], "3"); // agents_run
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap(); // second call should not panic
    }

    #[test]
    fn csv_empty_metrics_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_metrics(&[]).unwrap(); // should return Ok(())
    }

    #[test]
    fn integration_csv() {
        use bdi_agent::agent::AgentStoreBuilder;
        use bdi_core::WorldConfig;
        use bdi_llm::fallback::FallbackAdvisor;
        use bdi_world::{WorldBuilder, WorldObserver};

        use crate::observer::WorldOutputObserver;

        let config = WorldConfig {
            start_unix_secs: 0,
            base_tick_seconds: 5.0,
            time_speed: 1.0,
            total_ticks: Some(6),
            seed: 1,
            event_log_capacity: 500,
            event_perception_window_secs: 10.0,
            processed_event_ids_capacity: 200,
            hard_limit_turns: 10,
            idle_guard_threshold: 2,
        };

        let agents = AgentStoreBuilder::new(1).agent("Ada").agent("Grace").build();
        let mut world = WorldBuilder::new(config.clone(), agents)
            .advisor(Box::new(FallbackAdvisor))
            .build();

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = WorldOutputObserver::new(writer, &config);

        for _ in 0..6 {
            obs.on_tick_start(world.current_tick());
            let diagnostics = world.process_game_tick();
            obs.on_tick_end(world.current_tick(), &diagnostics);
            obs.on_snapshot(world.current_tick(), &world.agents);
        }
        obs.on_run_end(world.current_tick());
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_metrics.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 12, "expected 6 ticks x 2 agents = 12 metrics rows, got {}", rows.len());
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::{AgentMetricsRow, TickSummaryRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_metrics_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let rows = vec![
            AgentMetricsRow {
                agent_id: 0,
                tick: 1,
                active_intentions: 1,
                desire_count: 2,
                social_battery: 0.8,
                happiness: 0.5,
                loneliness: 0.1,
                in_conversation: false,
            },
            AgentMetricsRow {
                agent_id: 1,
                tick: 1,
                active_intentions: 0,
                desire_count: 1,
                social_battery: 0.4,
                happiness: 0.3,
                loneliness: 0.3,
                in_conversation: true,
            },
        ];
        w.write_metrics(&rows).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM agent_metrics", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn sqlite_in_conversation_as_integer() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_metrics(&[AgentMetricsRow {
            agent_id: 0,
            tick: 0,
            active_intentions: 1,
            desire_count: 1,
            social_battery: 1.0,
            happiness: 0.5,
            loneliness: 0.0,
            in_conversation: true,
        }])
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let val: i64 = conn
            .query_row(
                "SELECT in_conversation FROM agent_metrics WHERE agent_id = 0",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(val, 1, "in_conversation=true should be stored as 1");
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick: 7,
            unix_time_secs: 35,
            agents_run: 4,
            actions_dispatched: 9,
            force_quits: 1,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (tick, unix_time, force_quits): (i64, i64, i64) = conn
            .query_row(
                "SELECT tick, unix_time_secs, force_quits FROM tick_summaries WHERE tick = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(tick, 7);
        assert_eq!(unix_time, 35);
        assert_eq!(force_quits, 1);
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use crate::parquet::ParquetWriter;
    use crate::row::AgentMetricsRow;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("agent_metrics.parquet").exists());
        assert!(dir.path().join("tick_summaries.parquet").exists());
    }

    #[test]
    fn parquet_metrics_round_trip() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        let rows = vec![
            AgentMetricsRow {
                agent_id: 0,
                tick: 2,
                active_intentions: 1,
                desire_count: 2,
                social_battery: 0.9,
                happiness: 0.6,
                loneliness: 0.0,
                in_conversation: false,
            },
            AgentMetricsRow {
                agent_id: 1,
                tick: 2,
                active_intentions: 0,
                desire_count: 3,
                social_battery: 0.2,
                happiness: 0.4,
                loneliness: 0.2,
                in_conversation: true,
            },
        ];
        w.write_metrics(&rows).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("agent_metrics.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total_rows, 2, "expected 2 rows");

        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            field_names,
            [
                "agent_id",
                "tick",
                "active_intentions",
                "desire_count",
                "social_battery",
                "happiness",
                "loneliness",
                "in_conversation",
            ]
        );
    }

    #[test]
    fn parquet_boolean_column_type() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_metrics(&[AgentMetricsRow {
            agent_id: 0,
            tick: 0,
            active_intentions: 1,
            desire_count: 1,
            social_battery: 1.0,
            happiness: 0.5,
            loneliness: 0.0,
            in_conversation: true,
        }])
        .unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("agent_metrics.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();

        let in_conversation_field = schema.field_with_name("in_conversation").unwrap();
        assert_eq!(*in_conversation_field.data_type(), DataType::Boolean);
    }

    #[test]
    fn parquet_finish_required() {
        // A Parquet file whose writer was NOT closed is invalid (missing footer).
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_metrics(&[AgentMetricsRow {
                agent_id: 0,
                tick: 0,
                active_intentions: 0,
                desire_count: 0,
                social_battery: 1.0,
                happiness: 0.5,
                loneliness: 0.0,
                in_conversation: false,
            }])
            .unwrap();
            // Drop without calling finish() — ArrowWriter's Drop will NOT write the footer.
        }

        let file = std::fs::File::open(dir.path().join("agent_metrics.parquet")).unwrap();
        let result = ParquetRecordBatchReaderBuilder::try_new(file);
        assert!(result.is_err(), "file without Parquet footer should fail to open");
    }
}
