use shared::robot_hal::RobotDevStatsFrame;

use crate::TICK_PERIOD_S;

const COLLECTION_TIME_LENGTH: f32 = 1.0;

/// Collects control-tick timing statistics over a one-second window and
/// produces a single frame when the window closes. Idle unless a
/// StartDevStatsFrame command arms it.
pub struct DevStatsCollector {
    is_collecting: bool,

    // Collection metadata
    current_update_start_timestamp: f32,
    collection_start_timestamp: f32,
    last_update_timestamp: f32,
    stats_frame: Option<RobotDevStatsFrame>,

    // Running values to calculate stats
    update_elapsed_sum: f32,
    update_latency_sum: f32,
    update_latency_max: f32,
    command_count_sum: u32,
    command_count_max: u32,
    update_sample_count: u32,
}

impl DevStatsCollector {
    pub fn new() -> Self {
        Self {
            is_collecting: false,
            current_update_start_timestamp: 0.0,
            collection_start_timestamp: 0.0,
            last_update_timestamp: 0.0,
            stats_frame: None,
            update_elapsed_sum: 0.0,
            update_latency_sum: 0.0,
            update_latency_max: 0.0,
            command_count_sum: 0,
            command_count_max: 0,
            update_sample_count: 0,
        }
    }

    pub fn start_collection(&mut self, timestamp: f32) {
        if self.is_collecting {
            return;
        }

        self.is_collecting = true;
        self.collection_start_timestamp = timestamp;
        self.last_update_timestamp = 0.0;
        self.update_elapsed_sum = 0.0;
        self.update_latency_sum = 0.0;
        self.update_latency_max = 0.0;
        self.command_count_sum = 0;
        self.command_count_max = 0;
        self.update_sample_count = 0;
    }

    pub fn log_update_start(&mut self, timestamp: f32, command_count: u32) {
        if !self.is_collecting {
            return;
        }

        self.current_update_start_timestamp = timestamp;
        self.command_count_sum += command_count;
        self.command_count_max = self.command_count_max.max(command_count);

        if self.last_update_timestamp > 0.0 {
            let latency = timestamp - self.last_update_timestamp - TICK_PERIOD_S;

            self.update_latency_sum += latency;
            self.update_latency_max = self.update_latency_max.max(latency);
        }
    }

    pub fn log_update_end(&mut self, timestamp: f32) {
        if !self.is_collecting {
            return;
        }

        let elapsed = timestamp - self.current_update_start_timestamp;
        self.update_elapsed_sum += elapsed;
        self.update_sample_count += 1;
        self.last_update_timestamp = timestamp;

        if timestamp - self.collection_start_timestamp >= COLLECTION_TIME_LENGTH {
            self.end_collection(timestamp);
        }
    }

    pub fn pop_stats_frame(&mut self) -> Option<RobotDevStatsFrame> {
        self.stats_frame.take()
    }

    fn end_collection(&mut self, timestamp: f32) {
        self.is_collecting = false;

        let sample_count = self.update_sample_count.max(1) as f32;

        self.stats_frame = Some(RobotDevStatsFrame {
            timestamp: (timestamp * 1e3) as u64,
            update_latency_avg: self.update_latency_sum / sample_count,
            update_latency_max: self.update_latency_max,
            command_queue_length_avg: (self.command_count_sum as f32) / sample_count,
            command_queue_length_max: self.command_count_max,
            update_elapsed_avg: self.update_elapsed_sum / sample_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_one_frame_per_window() {
        let mut stats = DevStatsCollector::new();
        assert!(stats.pop_stats_frame().is_none());

        stats.start_collection(0.0);

        let mut now = 0.0;
        for _ in 0..110 {
            stats.log_update_start(now, 1);
            now += 0.001;
            stats.log_update_end(now);
            now += 0.009;
        }

        let frame = stats.pop_stats_frame().expect("window should have closed");
        assert_eq!(frame.command_queue_length_max, 1);
        assert!(frame.update_elapsed_avg > 0.0);
        assert!(stats.pop_stats_frame().is_none());
    }

    #[test]
    fn idle_collector_records_nothing() {
        let mut stats = DevStatsCollector::new();

        stats.log_update_start(0.0, 1);
        stats.log_update_end(2.0);

        assert!(stats.pop_stats_frame().is_none());
    }
}
