//! Integration tests for ms-output.

#[cfg(test)]
mod csv_tests {
    use ms_core::Dir4;
    use ms_grid::LaneDirection;
    use tempfile::TempDir;

    use crate::csv::{CsvFrameWriter, CsvRunLog};
    use crate::row::{FrameCellRow, TickRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn tick_row(tick: u64) -> TickRow {
        TickRow {
            tick,
            agents:           12,
            spawned:          2,
            retired:          1,
            successes:        1,
            lane_percentage:  37.5,
            coherence:        -2,
            lost:             0,
            average_progress: 1.25,
        }
    }

    fn cell_row(tick: u64, agent_id: u64, x: i32, y: i32) -> FrameCellRow {
        FrameCellRow {
            tick,
            agent_id,
            x,
            y,
            direction: Dir4::W,
            lane:      LaneDirection::West,
            potential: -40,
        }
    }

    fn read_all(path: std::path::PathBuf) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn files_created() {
        let dir = tmp();
        let _log = CsvRunLog::new(dir.path()).unwrap();
        let _frames = CsvFrameWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("run_log.csv").exists());
        assert!(dir.path().join("frames.csv").exists());
    }

    #[test]
    fn headers_correct() {
        let dir = tmp();
        let mut w = (CsvRunLog::new(dir.path()).unwrap(), CsvFrameWriter::new(dir.path()).unwrap());
        w.finish().unwrap();

        let (headers, rows) = read_all(dir.path().join("run_log.csv"));
        assert_eq!(
            headers,
            [
                "tick", "agents", "spawned", "retired", "successes",
                "lane_percentage", "coherence", "lost", "average_progress",
            ]
        );
        assert!(rows.is_empty());

        let (headers, _) = read_all(dir.path().join("frames.csv"));
        assert_eq!(headers, ["tick", "agent_id", "x", "y", "direction", "lane", "potential"]);
    }

    #[test]
    fn tick_row_written() {
        let dir = tmp();
        let mut w = CsvRunLog::new(dir.path()).unwrap();
        w.write_tick(&tick_row(7)).unwrap();
        w.finish().unwrap();

        let (_, rows) = read_all(dir.path().join("run_log.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][1], "12");
        assert_eq!(&rows[0][5], "37.500");
        assert_eq!(&rows[0][6], "-2");
        assert_eq!(&rows[0][8], "1.250");
    }

    #[test]
    fn frame_rows_written() {
        let dir = tmp();
        let mut w = CsvFrameWriter::new(dir.path()).unwrap();
        w.write_frame(&[cell_row(0, 1, 3, 4), cell_row(0, 2, 5, 4)]).unwrap();
        w.write_frame(&[]).unwrap();
        w.write_frame(&[cell_row(10, 2, 6, 4)]).unwrap();
        assert_eq!(w.frame_count(), 3);
        w.finish().unwrap();

        let (_, rows) = read_all(dir.path().join("frames.csv"));
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][1], "2"); // agent_id
        assert_eq!(&rows[1][2], "5"); // x
        assert_eq!(&rows[1][4], "W");
        assert_eq!(&rows[1][5], "west");
        assert_eq!(&rows[1][6], "-40");
        assert_eq!(&rows[2][0], "10");
    }

    #[test]
    fn single_purpose_writers_ignore_other_rows() {
        let dir = tmp();
        let mut log = CsvRunLog::new(dir.path()).unwrap();
        log.write_frame(&[cell_row(0, 1, 0, 0)]).unwrap();
        log.finish().unwrap();
        let mut frames = CsvFrameWriter::new(dir.path()).unwrap();
        frames.write_tick(&tick_row(0)).unwrap();
        frames.finish().unwrap();

        assert!(read_all(dir.path().join("run_log.csv")).1.is_empty());
        assert!(read_all(dir.path().join("frames.csv")).1.is_empty());
    }

    #[test]
    fn finish_idempotent() {
        let dir = tmp();
        let mut w = CsvRunLog::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        let result = CsvRunLog::new(&dir.path().join("absent"));
        assert!(result.is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use std::sync::Arc;

    use ms_agent::AgentBuilder;
    use ms_core::{AgentId, Dir4, GridPoint, Tick};
    use ms_grid::{Board, Feature, LaneDirection, TerrainBuilder};
    use ms_sim::{SimBuilder, SimConfig};
    use ms_tactical::PoolConfig;

    use crate::csv::{CsvFrameWriter, CsvRunLog};
    use crate::observer::{SimOutputObserver, frame_rows};

    fn p(x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, y)
    }

    fn board() -> Board {
        let mut b = TerrainBuilder::new(20, 20);
        let exit = Arc::new(Feature::spawner('S'));
        for s in [p(0, 0), p(19, 0), p(0, 19), p(19, 19)] {
            b.set_feature(s, Arc::clone(&exit)).unwrap();
        }
        Board::new(Arc::new(b.build()))
    }

    fn place(board: &mut Board, id: u64, at: GridPoint, facing: Dir4) {
        let agent = AgentBuilder::new(AgentId(id)).direction(facing).build();
        board.place_agent(at, agent).unwrap();
    }

    #[test]
    fn frame_rows_row_major() {
        let mut b = board();
        place(&mut b, 1, p(3, 2), Dir4::E);
        place(&mut b, 2, p(5, 1), Dir4::W);
        place(&mut b, 3, p(9, 1), Dir4::N);

        let rows = frame_rows(Tick(4), &b);
        let ids: Vec<u64> = rows.iter().map(|r| r.agent_id).collect();
        assert_eq!(ids, [2, 3, 1]);
        assert!(rows.iter().all(|r| r.tick == 4));
        assert_eq!((rows[0].x, rows[0].y), (5, 1));
        assert_eq!(rows[0].direction, Dir4::W);
        assert_eq!(rows[2].lane, LaneDirection::Empty);
    }

    #[test]
    fn empty_board_has_no_rows() {
        assert!(frame_rows(Tick::ZERO, &board()).is_empty());
    }

    #[test]
    fn integration_csv() {
        let config = SimConfig {
            total_ticks:          6,
            seed:                 1,
            arrival_rate:         0.0,
            initial_agents:       Some(3),
            frame_interval_ticks: 2,
            synchronous_routing:  true,
            pool:                 PoolConfig { workers: 1, queue_capacity: 4 },
            ..SimConfig::default()
        };
        let mut sim = SimBuilder::new(config, board()).build().unwrap();

        let dir = tempfile::tempdir().expect("create temp dir");
        let writer = (CsvRunLog::new(dir.path()).unwrap(), CsvFrameWriter::new(dir.path()).unwrap());
        let mut obs = SimOutputObserver::new(writer);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(obs.into_writer().1.frame_count(), 3);

        let mut rdr = csv::Reader::from_path(dir.path().join("run_log.csv")).unwrap();
        let ticks: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(ticks.len(), 6);

        // Frames at ticks 0, 2 and 4, one row per agent on the board then.
        let mut rdr = csv::Reader::from_path(dir.path().join("frames.csv")).unwrap();
        let cells: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        for t in [0usize, 2, 4] {
            let agents: usize = ticks[t][1].parse().unwrap();
            let in_frame = cells.iter().filter(|c| &c[0] == t.to_string()).count();
            assert_eq!(in_frame, agents, "frame at tick {t}");
        }
        assert!(cells.iter().all(|c| ["0", "2", "4"].contains(&&c[0])));
    }
}
