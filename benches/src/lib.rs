use criterion::Criterion;

#[cfg(any(target_arch = "x86_64", target_arch = "x86", all(target_arch = "aarch64", target_os = "linux")))]
pub type Benchmarker = Criterion<criterion_cycles_per_byte::CyclesPerByte>;
#[cfg(not(any(target_arch = "x86_64", target_arch = "x86", all(target_arch = "aarch64", target_os = "linux"))))]
pub type Benchmarker = Criterion;

pub const KB: usize = 1024;

/// Buffer sizes every throughput benchmark runs over.
pub const SIZES: [usize; 5] = [KB, 2 * KB, 4 * KB, 8 * KB, 16 * KB];

#[macro_export]
macro_rules! criterion_group_bench {
    ($Name:ident, $($Target:ident),+) => {
        #[cfg(any(target_arch = "x86_64", target_arch = "x86", all(target_arch = "aarch64", target_os = "linux")))]
        criterion_group!(
            name = $Name;
            config = Criterion::default().with_measurement(criterion_cycles_per_byte::CyclesPerByte);
            targets = $($Target),+
        );
        #[cfg(not(any(target_arch = "x86_64", target_arch = "x86", all(target_arch = "aarch64", target_os = "linux"))))]
        criterion_group!(
            name = $Name;
            config = Criterion::default();
            targets = $($Target),+
        );
    }
}
