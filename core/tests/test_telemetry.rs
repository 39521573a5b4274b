#[cfg(test)]
mod telemetry_snapshot_tests {
    use std::time::Duration;

    use segread_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    fn make_counters() -> TelemetryCounters {
        let mut c = TelemetryCounters::default();
        c.add_pull();
        c.add_pull();
        c.add_data_notification();
        c.add_ended_notification();
        c.add_drained(100);
        c.add_drained(28);
        c.add_emitted(64);
        c.add_emitted(64);
        c.add_emitted(0);
        c
    }

    fn make_timer() -> TelemetryTimer {
        let mut timer = TelemetryTimer::new();
        std::thread::sleep(Duration::from_millis(20)); // ensure elapsed > stage times
        timer.add_stage_time(Stage::Drain, Duration::from_millis(5));
        timer.add_stage_time(Stage::Emit, Duration::from_millis(10));
        timer.finish();
        timer
    }

    #[test]
    fn counters_track_drained_and_emitted_bytes() {
        let c = make_counters();
        assert_eq!(c.pulls, 2);
        assert_eq!(c.chunks_drained, 2);
        assert_eq!(c.bytes_drained, 128);
        assert_eq!(c.segments_emitted, 3);
        assert_eq!(c.bytes_emitted, 128);
        assert_eq!(c.empty_completions, 1);
    }

    #[test]
    fn snapshot_copies_counters_and_passes_sanity() {
        let snapshot = TelemetrySnapshot::from(&make_counters(), &make_timer());

        assert_eq!(snapshot.segments_emitted, 3);
        assert_eq!(snapshot.bytes_emitted, 128);
        assert!(snapshot.throughput_bytes_per_sec > 0.0);
        assert_eq!(snapshot.total_stage_time(), Duration::from_millis(15));
        assert!(snapshot.sanity_check());
    }

    #[test]
    fn sanity_check_flags_emitting_more_than_drained() {
        let mut c = make_counters();
        c.add_emitted(1);
        let snapshot = TelemetrySnapshot::from(&c, &make_timer());
        assert!(!snapshot.sanity_check());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = TelemetrySnapshot::from(&make_counters(), &make_timer());
        let json = snapshot.to_json().unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bytes_emitted, snapshot.bytes_emitted);
        assert_eq!(back.stage_times.get(Stage::Emit), Duration::from_millis(10));
    }

    #[test]
    fn stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Drain, Duration::from_micros(10));
        times.add(Stage::Drain, Duration::from_micros(15));
        assert_eq!(times.get(Stage::Drain), Duration::from_micros(25));
        assert_eq!(times.get(Stage::Open), Duration::ZERO);
        assert!((times.get_ms(Stage::Drain) - 0.025).abs() < 1e-9);
        assert_eq!(times.total(), Duration::from_micros(25));
        assert_eq!(format!("{}", Stage::Open), "open");
    }

    #[test]
    fn counters_survive_bincode() {
        let config = bincode::config::standard();
        let c = make_counters();
        let encoded = bincode::encode_to_vec(&c, config).unwrap();
        let (decoded, read): (TelemetryCounters, usize) =
            bincode::decode_from_slice(&encoded, config).unwrap();
        assert_eq!(read, encoded.len());
        assert_eq!(decoded, c);
    }

    #[test]
    fn finish_freezes_elapsed() {
        let timer = make_timer();
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.elapsed(), first);
    }
}
