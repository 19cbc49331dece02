// PHYSICAL
/// Average distance between earth and the sun, in meters
pub const AU: f64 = 1.495e11;
/// Mass of earth, in kilograms
pub const M0: f64 = 5.972e24;
/// SI gravitational constant, in m^3 kg^-1 s^-2
pub const G_ABS: f64 = 6.674e-11;
/// Julian year, in seconds
pub const SEC_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;
/// Gravitational constant in earth masses, AU and years, derived from the SI values above
pub const G_DERIVED: f64 = G_ABS * M0 * SEC_PER_YEAR * SEC_PER_YEAR / (AU * AU * AU);
/// Default gravitational constant in earth masses, AU and years. The classic
/// preset's velocities are tuned to this value rather than to `G_DERIVED`.
pub const G: f64 = 1.184e-4;
/// Mass of the sun, in earth masses
pub const SUN_MASS: f64 = 333000.0;

// TIMING
/// Interval between two render syncs, in milliseconds (60 Hz)
pub const DISPLAY_INTERVAL_MS: f64 = 1000.0 / 60.0;
/// Largest accepted display interval, in milliseconds (one hour)
pub const MAX_DISPLAY_INTERVAL_MS: f64 = 60.0 * 60.0 * 1000.0;
/// Initial interval between two integrator calls, in milliseconds
pub const DEFAULT_RUN_TIME_MS: f64 = DISPLAY_INTERVAL_MS;
/// Simulated years per integrator call
pub const DEFAULT_DT: f64 = 0.001;
/// Upper bound on sub-steps per tick. Sets the floor on run time.
pub const MAX_STEPS_PER_TICK: u32 = 1000;
/// Multiplier applied by a single speed up or slow down
pub const SPEED_FACTOR: f64 = 2.0;

// CAMERA
/// Pixels per AU
pub const DEFAULT_SCALE: f64 = 200.0;
/// Bounds on display units per AU. Zooming saturates at these.
pub const MIN_SCALE: f64 = 1e-9;
pub const MAX_SCALE: f64 = 1e12;
/// Multiplier applied by a single zoom step
pub const ZOOM_FACTOR: f64 = 1.1;
/// Display units moved by a single pan
pub const PAN_AMOUNT: f64 = 10.0;
/// Bodies smaller than this on screen are still pickable within this radius, in pixels
pub const MIN_PICK_RADIUS: f64 = 4.0;
