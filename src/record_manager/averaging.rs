// Pure reductions: N same-tier snapshots -> one averaged snapshot.
// Every output value is an arithmetic mean rounded to two decimals.

use std::collections::BTreeMap;

use crate::models::{ContainerSnapshot, ContainerSnapshotSet, FsStats, HostSnapshot};

/// Average host snapshots field by field.
///
/// Numeric fields and `extra_filesystems` entries divide by the total snapshot count.
/// `temperatures` divides by the number of snapshots that reported any temperature, so hosts
/// whose sensors drop out intermittently are not dragged toward zero. A sparse field is left
/// out of the result when no input reported it.
pub fn average_host_snapshots(snapshots: &[HostSnapshot]) -> HostSnapshot {
    snapshots
        .iter()
        .fold(HostSums::default(), HostSums::add)
        .finish()
}

/// Average container snapshot sets, matching containers by name.
///
/// Every container divides by the total set count, including sets it is missing from.
/// Output is ordered by container name.
pub fn average_container_snapshot_sets(sets: &[ContainerSnapshotSet]) -> ContainerSnapshotSet {
    sets.iter()
        .fold(ContainerSums::default(), ContainerSums::add)
        .finish()
}

fn two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Default)]
struct HostSums {
    count: usize,
    totals: HostSnapshot,
    temperatures: BTreeMap<String, f64>,
    temperature_reports: usize,
    extra_filesystems: BTreeMap<String, FsStats>,
}

impl HostSums {
    fn add(mut self, s: &HostSnapshot) -> Self {
        self.count += 1;
        let t = &mut self.totals;
        t.cpu += s.cpu;
        t.mem += s.mem;
        t.mem_used += s.mem_used;
        t.mem_pct += s.mem_pct;
        t.mem_buff_cache += s.mem_buff_cache;
        t.swap += s.swap;
        t.swap_used += s.swap_used;
        t.disk_total += s.disk_total;
        t.disk_used += s.disk_used;
        t.disk_pct += s.disk_pct;
        t.disk_read_ps += s.disk_read_ps;
        t.disk_write_ps += s.disk_write_ps;
        t.network_sent += s.network_sent;
        t.network_recv += s.network_recv;

        // One report per snapshot, however many sensors it carried.
        if let Some(temps) = s.temperatures.as_ref().filter(|m| !m.is_empty()) {
            self.temperature_reports += 1;
            for (label, value) in temps {
                *self.temperatures.entry(label.clone()).or_default() += value;
            }
        }

        if let Some(filesystems) = &s.extra_filesystems {
            for (mount, fs) in filesystems {
                let sum = self.extra_filesystems.entry(mount.clone()).or_default();
                sum.disk_total += fs.disk_total;
                sum.disk_used += fs.disk_used;
                sum.disk_read_ps += fs.disk_read_ps;
                sum.disk_write_ps += fs.disk_write_ps;
            }
        }
        self
    }

    fn finish(self) -> HostSnapshot {
        if self.count == 0 {
            return HostSnapshot::default();
        }
        let n = self.count as f64;
        let avg = |sum: f64| two_decimals(sum / n);
        let t = &self.totals;

        let reports = self.temperature_reports as f64;
        let temperatures: Option<BTreeMap<String, f64>> =
            (!self.temperatures.is_empty()).then(|| {
                self.temperatures
                    .iter()
                    .map(|(label, sum)| (label.clone(), two_decimals(sum / reports)))
                    .collect()
            });

        let extra_filesystems: Option<BTreeMap<String, FsStats>> =
            (!self.extra_filesystems.is_empty()).then(|| {
                self.extra_filesystems
                    .iter()
                    .map(|(mount, fs)| {
                        let avg_fs = FsStats {
                            disk_total: avg(fs.disk_total),
                            disk_used: avg(fs.disk_used),
                            disk_read_ps: avg(fs.disk_read_ps),
                            disk_write_ps: avg(fs.disk_write_ps),
                        };
                        (mount.clone(), avg_fs)
                    })
                    .collect()
            });

        HostSnapshot {
            cpu: avg(t.cpu),
            mem: avg(t.mem),
            mem_used: avg(t.mem_used),
            mem_pct: avg(t.mem_pct),
            mem_buff_cache: avg(t.mem_buff_cache),
            swap: avg(t.swap),
            swap_used: avg(t.swap_used),
            disk_total: avg(t.disk_total),
            disk_used: avg(t.disk_used),
            disk_pct: avg(t.disk_pct),
            disk_read_ps: avg(t.disk_read_ps),
            disk_write_ps: avg(t.disk_write_ps),
            network_sent: avg(t.network_sent),
            network_recv: avg(t.network_recv),
            temperatures,
            extra_filesystems,
        }
    }
}

#[derive(Default)]
struct ContainerSums {
    count: usize,
    by_name: BTreeMap<String, ContainerSnapshot>,
}

impl ContainerSums {
    fn add(mut self, set: &ContainerSnapshotSet) -> Self {
        self.count += 1;
        for c in &set.0 {
            let sum = self
                .by_name
                .entry(c.name.clone())
                .or_insert_with(|| ContainerSnapshot {
                    name: c.name.clone(),
                    ..Default::default()
                });
            sum.cpu += c.cpu;
            sum.mem += c.mem;
            sum.network_sent += c.network_sent;
            sum.network_recv += c.network_recv;
        }
        self
    }

    fn finish(self) -> ContainerSnapshotSet {
        if self.count == 0 {
            return ContainerSnapshotSet::default();
        }
        let n = self.count as f64;
        self.by_name
            .into_values()
            .map(|sum| ContainerSnapshot {
                name: sum.name,
                cpu: two_decimals(sum.cpu / n),
                mem: two_decimals(sum.mem / n),
                network_sent: two_decimals(sum.network_sent / n),
                network_recv: two_decimals(sum.network_recv / n),
            })
            .collect::<Vec<_>>()
            .into()
    }
}
