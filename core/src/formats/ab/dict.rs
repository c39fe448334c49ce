use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Descriptive metadata for a known forcing field.
///
/// The strings (padding included) match what the model's own converter
/// writes, so downstream tooling sees identical attributes either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarAtts {
    pub long_name: &'static str,
    pub standard_name: &'static str,
    pub units: &'static str,
}

/// The known forcing fields, keyed by their `.b` variable name.
///
/// Read-only; safe to share between any number of open datasets.
static KNOWN_VARS: Lazy<HashMap<&'static str, VarAtts>> = Lazy::new(|| {
    HashMap::from([
        (
            "radflx",
            VarAtts {
                long_name: " surf. rad. flux ",
                standard_name: "surface_net_downward_radiation_flux",
                units: "w/m2",
            },
        ),
        (
            "shwflx",
            VarAtts {
                long_name: " surf. shw. flux  ",
                standard_name: "surface_net_downward_shortwave_flux",
                units: "w/m2",
            },
        ),
        (
            "vapmix",
            VarAtts {
                long_name: " vapor mix. ratio ",
                standard_name: "specific_humidity",
                units: "kg/kg",
            },
        ),
        (
            "airtmp",
            VarAtts {
                long_name: " air temperature  ",
                standard_name: "air_temperature",
                units: "degC",
            },
        ),
        (
            "surtmp",
            VarAtts {
                long_name: " sea surf. temp.  ",
                standard_name: "sea_surface_temperature",
                units: "degC",
            },
        ),
        (
            "seatmp",
            VarAtts {
                long_name: " sea surf. temp.  ",
                standard_name: "sea_surface_temperature",
                units: "degC",
            },
        ),
        (
            "precip",
            VarAtts {
                long_name: " precipitation    ",
                standard_name: "lwe_precipitation_rate",
                units: "m/s",
            },
        ),
        (
            "wndspd",
            VarAtts {
                long_name: " 10m wind speed   ",
                standard_name: "wind_speed",
                units: "m/s",
            },
        ),
        (
            "tauewd",
            VarAtts {
                long_name: " Ewd wind stress  ",
                standard_name: "eastward_wind_stress",
                units: "N/m^2",
            },
        ),
        (
            "taunwd",
            VarAtts {
                long_name: " Nwd wind stress  ",
                standard_name: "northward_wind_stress",
                units: "N/m^2",
            },
        ),
    ])
});

pub fn find(var_name: &str) -> Option<&'static VarAtts> {
    KNOWN_VARS.get(var_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_name() {
        let atts = find("airtmp").unwrap();
        assert_eq!(atts.long_name, " air temperature  ");
        assert_eq!(atts.standard_name, "air_temperature");
        assert_eq!(atts.units, "degC");
    }

    #[test]
    fn unknown_name() {
        assert!(find("salinity").is_none());
    }
}
