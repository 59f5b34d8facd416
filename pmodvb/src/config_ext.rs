//! Extension pour intégrer la source DVB dans pmoconfig
//!
//! Ce module fournit le trait `DvbConfigExt` qui ajoute à `pmoconfig::Config`
//! les réglages de la source DVB (bus, service, délais d'appel).
//!
//! # Exemple
//!
//! ```no_run
//! use pmoconfig::get_config;
//! use pmodvb::DvbConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//!
//! if !config.get_dvb_enabled()? {
//!     println!("DVB source is disabled");
//!     return Ok(());
//! }
//!
//! let settings = config.dvb_settings()?;
//! println!("Daemon {} on the {} bus", settings.service, settings.bus);
//! # Ok(())
//! # }
//! ```

use crate::bus::{DVB_SERVICE, MANAGER_PATH};
use crate::settings::{
    BusKind, DvbSettings, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_RESOLVE_CONCURRENCY,
};
use anyhow::{anyhow, Result};
use pmoconfig::Config;
use serde_yaml::{Number, Value};
use std::time::Duration;

const DVB_KEY: [&str; 2] = ["sources", "dvb"];

fn dvb_path(key: &str) -> [&str; 3] {
    [DVB_KEY[0], DVB_KEY[1], key]
}

/// Trait d'extension pour gérer la configuration DVB dans pmoconfig
///
/// # Auto-persist des valeurs par défaut
///
/// Les getters persistent automatiquement les valeurs par défaut dans la
/// configuration si elles n'existent pas encore ou sont invalides.
pub trait DvbConfigExt {
    /// Vérifie si la source DVB est activée (default: `true`)
    fn get_dvb_enabled(&self) -> Result<bool>;

    fn set_dvb_enabled(&self, enabled: bool) -> Result<()>;

    /// Bus hébergeant le démon (default: session)
    fn get_dvb_bus(&self) -> Result<BusKind>;

    fn set_dvb_bus(&self, bus: BusKind) -> Result<()>;

    /// Nom de service du démon (default: `org.gnome.DVB`)
    fn get_dvb_service(&self) -> Result<String>;

    fn set_dvb_service(&self, service: &str) -> Result<()>;

    /// Chemin de l'objet Manager (default: `/org/gnome/DVB/Manager`)
    fn get_dvb_manager_path(&self) -> Result<String>;

    fn set_dvb_manager_path(&self, path: &str) -> Result<()>;

    /// Délai maximal d'un appel, en secondes; `0` désactive le délai
    fn get_dvb_call_timeout_secs(&self) -> Result<u64>;

    fn set_dvb_call_timeout_secs(&self, secs: u64) -> Result<()>;

    /// Nombre de groupes résolus en parallèle (default: 1)
    fn get_dvb_resolve_concurrency(&self) -> Result<usize>;

    fn set_dvb_resolve_concurrency(&self, concurrency: usize) -> Result<()>;

    /// Instantané complet des réglages DVB
    fn dvb_settings(&self) -> Result<DvbSettings>;
}

impl DvbConfigExt for Config {
    fn get_dvb_enabled(&self) -> Result<bool> {
        match self.get_value(&dvb_path("enabled")) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_dvb_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_dvb_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&dvb_path("enabled"), Value::Bool(enabled))
    }

    fn get_dvb_bus(&self) -> Result<BusKind> {
        match self.get_value(&dvb_path("bus")) {
            Ok(Value::String(s)) => s.parse::<BusKind>().map_err(|e| anyhow!(e)),
            _ => {
                self.set_dvb_bus(BusKind::Session)?;
                Ok(BusKind::Session)
            }
        }
    }

    fn set_dvb_bus(&self, bus: BusKind) -> Result<()> {
        self.set_value(&dvb_path("bus"), Value::String(bus.to_string()))
    }

    fn get_dvb_service(&self) -> Result<String> {
        match self.get_value(&dvb_path("service")) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_dvb_service(DVB_SERVICE)?;
                Ok(DVB_SERVICE.to_string())
            }
        }
    }

    fn set_dvb_service(&self, service: &str) -> Result<()> {
        self.set_value(&dvb_path("service"), Value::String(service.to_string()))
    }

    fn get_dvb_manager_path(&self) -> Result<String> {
        match self.get_value(&dvb_path("manager_path")) {
            Ok(Value::String(s)) if s.starts_with('/') => Ok(s),
            _ => {
                self.set_dvb_manager_path(MANAGER_PATH)?;
                Ok(MANAGER_PATH.to_string())
            }
        }
    }

    fn set_dvb_manager_path(&self, path: &str) -> Result<()> {
        self.set_value(&dvb_path("manager_path"), Value::String(path.to_string()))
    }

    fn get_dvb_call_timeout_secs(&self) -> Result<u64> {
        match self
            .get_value(&dvb_path("call_timeout_secs"))
            .ok()
            .and_then(|v| v.as_u64())
        {
            Some(secs) => Ok(secs),
            None => {
                self.set_dvb_call_timeout_secs(DEFAULT_CALL_TIMEOUT_SECS)?;
                Ok(DEFAULT_CALL_TIMEOUT_SECS)
            }
        }
    }

    fn set_dvb_call_timeout_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &dvb_path("call_timeout_secs"),
            Value::Number(Number::from(secs)),
        )
    }

    fn get_dvb_resolve_concurrency(&self) -> Result<usize> {
        match self
            .get_value(&dvb_path("resolve_concurrency"))
            .ok()
            .and_then(|v| v.as_u64())
        {
            Some(n) if n > 0 => Ok(n as usize),
            _ => {
                self.set_dvb_resolve_concurrency(DEFAULT_RESOLVE_CONCURRENCY)?;
                Ok(DEFAULT_RESOLVE_CONCURRENCY)
            }
        }
    }

    fn set_dvb_resolve_concurrency(&self, concurrency: usize) -> Result<()> {
        self.set_value(
            &dvb_path("resolve_concurrency"),
            Value::Number(Number::from(concurrency as u64)),
        )
    }

    fn dvb_settings(&self) -> Result<DvbSettings> {
        let timeout = match self.get_dvb_call_timeout_secs()? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(DvbSettings {
            bus: self.get_dvb_bus()?,
            service: self.get_dvb_service()?,
            manager_path: self.get_dvb_manager_path()?,
            call_timeout: timeout,
            resolve_concurrency: self.get_dvb_resolve_concurrency()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dvb_settings() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert!(config.get_dvb_enabled().unwrap());
        assert_eq!(config.dvb_settings().unwrap(), DvbSettings::default());
    }

    #[test]
    fn test_overridden_dvb_settings() {
        let yaml = r#"
sources:
  dvb:
    bus: system
    service: org.example.DVB
    call_timeout_secs: 0
    resolve_concurrency: 4
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        let settings = config.dvb_settings().unwrap();
        assert_eq!(settings.bus, BusKind::System);
        assert_eq!(settings.service, "org.example.DVB");
        assert_eq!(settings.manager_path, MANAGER_PATH);
        assert_eq!(settings.call_timeout, None);
        assert_eq!(settings.resolve_concurrency, 4);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let yaml = r#"
sources:
  dvb:
    manager_path: relative/path
    resolve_concurrency: 0
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.get_dvb_manager_path().unwrap(), MANAGER_PATH);
        assert_eq!(config.get_dvb_resolve_concurrency().unwrap(), 1);
        // Defaults are written back
        assert_eq!(
            config
                .get_value(&["sources", "dvb", "resolve_concurrency"])
                .unwrap(),
            Value::Number(Number::from(1u64))
        );
    }

    #[test]
    fn test_unknown_bus_is_an_error() {
        let yaml = "sources:\n  dvb:\n    bus: starter\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert!(config.get_dvb_bus().is_err());
    }

    #[test]
    fn test_setters_round_trip() {
        let config = Config::from_yaml_str("{}").unwrap();
        config.set_dvb_enabled(false).unwrap();
        config.set_dvb_bus(BusKind::System).unwrap();
        config.set_dvb_call_timeout_secs(5).unwrap();
        assert!(!config.get_dvb_enabled().unwrap());
        assert_eq!(config.get_dvb_bus().unwrap(), BusKind::System);
        assert_eq!(config.get_dvb_call_timeout_secs().unwrap(), 5);
    }
}
