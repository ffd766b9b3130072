//! CPU sets in the kernel "list format"
//!
//! The same notation is used by `/sys/devices/system/cpu/online`,
//! `Cpus_allowed_list` in `/proc/<pid>/status`, `/proc/irq/<N>/smp_affinity_list`
//! and the `--cpulist` flag: comma separated CPU numbers or inclusive ranges,
//! e.g. `0-3,8-11` or `5`. See cpuset(7), "List format".

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use super::errors::KnitError;
use super::types::CpuId;

/// Highest CPU count the kernel can be built with (`CONFIG_NR_CPUS` under MAXSMP)
pub const MAX_CPUS: u32 = 8192;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuSet(BTreeSet<CpuId>);

impl CpuSet {
    /// Parse a list-format string. Surrounding whitespace (including the
    /// trailing newline of sysfs files) is ignored; an empty string is the
    /// empty set.
    ///
    /// # Errors
    /// Returns [`KnitError::Config`] for anything that is not a valid list,
    /// including CPU numbers at or above [`MAX_CPUS`].
    pub fn parse(list: &str) -> Result<Self, KnitError> {
        let mut cpus = BTreeSet::new();
        let list = list.trim();
        if list.is_empty() {
            return Ok(Self(cpus));
        }

        for range in list.split(',') {
            let range = range.trim();
            if let Some((start, end)) = range.split_once('-') {
                let start = parse_cpu(start, list)?;
                let end = parse_cpu(end, list)?;
                if start > end {
                    return Err(KnitError::Config(format!(
                        "invalid cpu range \"{range}\" in \"{list}\""
                    )));
                }
                cpus.extend((start..=end).map(CpuId));
            } else {
                cpus.insert(CpuId(parse_cpu(range, list)?));
            }
        }

        Ok(Self(cpus))
    }

    pub fn contains(&self, cpu: CpuId) -> bool {
        self.0.contains(&cpu)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// CPUs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = CpuId> + '_ {
        self.0.iter().copied()
    }

    pub fn intersects(&self, other: &CpuSet) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }
}

fn parse_cpu(token: &str, list: &str) -> Result<u32, KnitError> {
    let token = token.trim();
    let cpu: u32 = token
        .parse()
        .map_err(|_| KnitError::Config(format!("invalid cpu \"{token}\" in \"{list}\"")))?;
    if cpu >= MAX_CPUS {
        return Err(KnitError::Config(format!(
            "cpu {cpu} in \"{list}\" is out of range (max {})",
            MAX_CPUS - 1
        )));
    }
    Ok(cpu)
}

/// Formats back to the compact list format, collapsing runs into ranges.
impl fmt::Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut iter = self.0.iter().map(|c| c.0).peekable();
        while let Some(start) = iter.next() {
            let mut end = start;
            while let Some(next) = iter.next_if(|&cpu| Some(cpu) == end.checked_add(1)) {
                end = next;
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

/// Serialized as a plain array of CPU numbers.
impl Serialize for CpuSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(set: &CpuSet) -> Vec<u32> {
        set.iter().map(|c| c.0).collect()
    }

    #[test]
    fn test_parse_ranges_and_singles() {
        let set = CpuSet::parse("0-3,8-9,12").unwrap();
        assert_eq!(ids(&set), vec![0, 1, 2, 3, 8, 9, 12]);
    }

    #[test]
    fn test_parse_sysfs_content_with_newline() {
        let set = CpuSet::parse("0-7\n").unwrap();
        assert_eq!(set.len(), 8);
    }

    #[test]
    fn test_parse_empty_is_empty_set() {
        assert!(CpuSet::parse("").unwrap().is_empty());
        assert!(CpuSet::parse(" \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CpuSet::parse("a-b").unwrap_err().is_config());
        assert!(CpuSet::parse("3-1").is_err());
        assert!(CpuSet::parse("1,,2").is_err());
        assert!(CpuSet::parse("-1").is_err());
    }

    #[test]
    fn test_display_collapses_runs() {
        let set = CpuSet::parse("5,0,1,2,7,8").unwrap();
        assert_eq!(set.to_string(), "0-2,5,7-8");
        assert_eq!(CpuSet::default().to_string(), "");
    }

    #[test]
    fn test_display_at_upper_bound() {
        let top = MAX_CPUS - 1;
        let set = CpuSet::parse(&format!("0,{}-{top}", top - 2)).unwrap();
        assert_eq!(set.to_string(), format!("0,{}-{top}", top - 2));

        let set = CpuSet(BTreeSet::from([CpuId(u32::MAX - 1), CpuId(u32::MAX)]));
        assert_eq!(set.to_string(), format!("{}-{}", u32::MAX - 1, u32::MAX));
    }

    #[test]
    fn test_parse_rejects_cpus_beyond_kernel_limit() {
        assert!(CpuSet::parse("4294967295").unwrap_err().is_config());
        assert!(CpuSet::parse("0-4294967295").unwrap_err().is_config());
        assert!(CpuSet::parse(&MAX_CPUS.to_string()).unwrap_err().is_config());
        assert_eq!(CpuSet::parse(&format!("0-{}", MAX_CPUS - 1)).unwrap().len(), 8192);
    }

    #[test]
    fn test_intersects() {
        let a = CpuSet::parse("0-3").unwrap();
        assert!(a.intersects(&CpuSet::parse("2-5").unwrap()));
        assert!(!a.intersects(&CpuSet::parse("4").unwrap()));
    }

    #[test]
    fn test_serializes_as_array() {
        let set = CpuSet::parse("1-2").unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,2]");
    }
}
