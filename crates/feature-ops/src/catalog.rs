//! Fastener catalog for through holes.
//!
//! Each entry sizes a hole (`radius`) and describes the fastener that is
//! exported into it: head diameter, shank length and the point of the
//! template solid that lands on the hole center.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FastenerSpec {
    /// Class id of the fastener's faces (26..=41).
    pub id: u32,
    /// Template point mapped onto the hole center.
    pub origin: [f64; 3],
    pub radius: f64,
    pub head_diameter: f64,
    pub length: Option<f64>,
}

const fn spec(id: u32, origin: [f64; 3], radius: f64, head_diameter: f64, length: Option<f64>) -> FastenerSpec {
    FastenerSpec {
        id,
        origin,
        radius,
        head_diameter,
        length,
    }
}

pub const FASTENER_CATALOG: [FastenerSpec; 16] = [
    spec(26, [-131.62278992, 499.21603534, 213.33373081], 6.0, 13.0, None),
    spec(27, [-163.21153959, 490.62807964, 136.70991570], 5.0, 12.5, Some(34.0)),
    spec(28, [-428.0, 512.0, -59.7], 8.0, 18.0, Some(156.0)),
    spec(29, [-15.09890165, -640.26377459, 142.65431662], 6.0, 12.0, Some(60.0)),
    spec(30, [455.99775616, -705.00777231, 321.38351909], 4.0, 12.0, Some(625.0)),
    spec(31, [-499.93484604, 517.14755762, -104.46571084], 5.0, 11.0, None),
    spec(32, [-763.86725194, 378.50264480, 96.99999998], 4.0, 10.0, None),
    spec(33, [-23.84879311, -494.30586595, 480.14758457], 6.0, 9.5, Some(38.0)),
    spec(34, [39.348, -800.0, -119.9], 8.0, 15.0, Some(85.0)),
    spec(35, [-76.61909011, -678.15875122, -86.78030803], 7.0, 15.0, Some(150.0)),
    spec(36, [2787.58864995, -719.89579363, 52.26333220], 6.5, 14.0, Some(115.0)),
    spec(37, [2692.49611450, -709.97719250, 61.39517525], 7.0, 11.0, Some(99.0)),
    spec(38, [2777.11290819, -731.81018061, -163.99336632], 7.0, 24.5, Some(91.0)),
    spec(39, [2723.24266961, -570.57599206, 127.71953981], 3.0, 6.8, Some(20.0)),
    spec(40, [2720.7, 547.0, 629.0], 4.0, 13.0, Some(28.0)),
    spec(41, [2773.32440459, 718.59601920, -158.52511216], 8.0, 18.0, Some(116.0)),
];

pub const FIRST_FASTENER_ID: u32 = 26;
pub const LAST_FASTENER_ID: u32 = 41;

pub fn lookup(id: u32) -> Option<&'static FastenerSpec> {
    FASTENER_CATALOG.iter().find(|s| s.id == id)
}

/// Uniform pick over the whole catalog.
pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> &'static FastenerSpec {
    FASTENER_CATALOG
        .choose(rng)
        .unwrap_or(&FASTENER_CATALOG[0])
}
