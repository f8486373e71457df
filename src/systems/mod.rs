pub mod sdk;
#[cfg(feature="system-stage_table")]        pub mod stage_table;
#[cfg(feature="system-accrual")]            pub mod accrual;
#[cfg(feature="system-emission_governor")]  pub mod emission_governor;
#[cfg(feature="system-offline_simulation")] pub mod offline_simulation;
#[cfg(feature="system-calibration")]        pub mod calibration;
