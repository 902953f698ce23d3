//-------------------------------------------------------------------//
//          lemsim : electron avalanches in a LEM unit cell          //
//                            version 1.0                            //
//                        :) Share & enjoy :)                        //
//-------------------------------------------------------------------//
// Electron collision kinematics and argon cross sections follow     //
// eduPIC; when you use this code, please cite:                      //
// Z. Donko, A. Derzsi, M. Vass, B. Horvath, S. Wilczek              //
// B. Hartmann, P. Hartmann:                                         //
// "eduPIC: an introductory particle based code for radio-frequency  //
// plasma simulation"                                                //
// Plasma Sources Science and Technology, vol 30, 095017 (2021)      //
//-------------------------------------------------------------------//
// This program is free software: you can redistribute it and/or     //
// modify it under the terms of the GNU General Public License as    //
// published by the Free Software Foundation, version 3.             //
// This program is distributed in the hope that it will be useful,   //
// but WITHOUT ANY WARRANTY; without even the implied warranty of    //
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU  //
// General Public License for more details at                        //
// https://www.gnu.org/licenses/gpl-3.0.html.                        //
//-------------------------------------------------------------------//

//! Binds field providers to the active simulation volume.

use tracing::info;

use crate::field::FieldProvider;
use crate::geometry::{SimulationVolume, Vec3};
use crate::medium::Medium;

/// Outcome of a field query at one point.
#[derive(Clone, Copy, Debug)]
pub enum FieldQuery<'a> {
    /// Inside the volume and in a drift medium.
    Drift { field: Vec3, medium: &'a dyn Medium },
    /// Outside the simulation volume or outside every component.
    OutsideArea,
    /// Inside the volume, in a material without a drift medium.
    OutsideMedium { material: usize },
}

#[derive(Debug)]
pub struct Sensor {
    components: Vec<Box<dyn FieldProvider>>,
    area: SimulationVolume,
}

impl Sensor {
    pub fn new(area: SimulationVolume) -> Self {
        info!(min = ?area.min(), max = ?area.max(), "sensor area [cm]");
        Self { components: Vec::new(), area }
    }

    pub fn add_component(&mut self, component: Box<dyn FieldProvider>) {
        self.components.push(component);
    }

    pub fn components(&self) -> &[Box<dyn FieldProvider>] {
        &self.components
    }

    pub fn area(&self) -> &SimulationVolume {
        &self.area
    }

    pub fn is_in_area(&self, p: Vec3) -> bool {
        self.area.contains(p)
    }

    /// Fields of all components covering `p` are summed; the medium is taken
    /// from the first of them.
    pub fn electric_field(&self, p: Vec3) -> FieldQuery<'_> {
        if !self.area.contains(p) {
            return FieldQuery::OutsideArea;
        }
        let mut total = Vec3::ZERO;
        let mut first: Option<(usize, &dyn FieldProvider)> = None;
        for component in &self.components {
            if let Some(sample) = component.electric_field(p) {
                total = total + sample.field;
                if first.is_none() {
                    first = Some((sample.material, component.as_ref()));
                }
            }
        }
        match first {
            None => FieldQuery::OutsideArea,
            Some((material, component)) => match component.medium(material) {
                Some(medium) => FieldQuery::Drift { field: total, medium },
                None => FieldQuery::OutsideMedium { material },
            },
        }
    }

    /// Weighting field of `label` summed over all components.
    pub fn weighting_field(&self, p: Vec3, label: &str) -> Vec3 {
        self.components
            .iter()
            .filter_map(|c| c.weighting_field(p, label))
            .fold(Vec3::ZERO, |acc, w| acc + w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::SimulationConfig;
    use crate::field::{assign_gas_medium, LayeredCell};
    use crate::geometry::Axis;
    use crate::medium::GasMixture;

    const SLAB: &str = r#"
unit: cm
half_width: 0.01
materials:
  - permittivity: 1.0
  - permittivity: 3.5
layers:
  - name: gap
    z_min: 0.0
    z_max: 0.01
    field: [0.0, 0.0, 2000.0]
    material: 0
  - name: plate
    z_min: 0.01
    z_max: 0.02
    field: [0.0, 0.0, 0.0]
    material: 1
electrodes:
  - label: pad
    z_min: 0.0
    z_max: 0.01
"#;

    fn sensor() -> Sensor {
        let mut cell = LayeredCell::from_yaml(SLAB).unwrap();
        cell.enable_periodicity(Axis::X);
        cell.set_weighting_field("pad").unwrap();
        let gas = GasMixture::initialise(&SimulationConfig::default().gas).unwrap();
        assign_gas_medium(&mut cell, Arc::new(gas), 1e-3).unwrap();
        let area = SimulationVolume::new(Vec3::new(-0.05, -0.01, 0.0), Vec3::new(0.05, 0.01, 0.02)).unwrap();
        let mut sensor = Sensor::new(area);
        sensor.add_component(Box::new(cell));
        sensor
    }

    #[test]
    fn gas_points_report_field_and_medium() {
        match sensor().electric_field(Vec3::new(0.033, 0.0, 0.005)) {
            FieldQuery::Drift { field, medium } => {
                assert_eq!(field, Vec3::new(0.0, 0.0, 2000.0));
                assert!(medium.name().contains("ar"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn solid_and_outside_points_are_classified() {
        let s = sensor();
        assert!(matches!(
            s.electric_field(Vec3::new(0.0, 0.0, 0.015)),
            FieldQuery::OutsideMedium { material: 1 }
        ));
        assert!(matches!(s.electric_field(Vec3::new(0.0, 0.0, -0.001)), FieldQuery::OutsideArea));
        assert!(matches!(s.electric_field(Vec3::new(0.06, 0.0, 0.005)), FieldQuery::OutsideArea));
        assert!(!s.is_in_area(Vec3::new(0.0, 0.02, 0.005)));
    }

    #[test]
    fn weighting_field_is_summed_over_components() {
        let s = sensor();
        let w = s.weighting_field(Vec3::new(0.0, 0.0, 0.005), "pad");
        assert!((w.z - 100.0).abs() < 1e-9);
        assert_eq!(s.weighting_field(Vec3::new(0.0, 0.0, 0.015), "pad"), Vec3::ZERO);
        assert_eq!(s.weighting_field(Vec3::new(0.0, 0.0, 0.005), "other"), Vec3::ZERO);
    }
}
