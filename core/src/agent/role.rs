//! Agent Role System
//!
//! The three fixed personas of the travel-health group chat. A role is just
//! a stable name plus the instruction text the model receives as its system
//! prompt.

/// Defines the persona of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    /// Endemic and outbreak-prone diseases at the destination
    DiseaseIntelligence,
    /// Vaccines for the detected diseases and where to get them
    VaccineLocator,
    /// Scheduling a vaccination appointment
    VaccineBooker,
}

impl AgentRole {
    /// Every role, in default turn order
    pub const ALL: [AgentRole; 3] = [
        AgentRole::DiseaseIntelligence,
        AgentRole::VaccineLocator,
        AgentRole::VaccineBooker,
    ];

    /// Get the agent name for this role
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiseaseIntelligence => "disease_intelligent",
            Self::VaccineLocator => "vaccine_locator",
            Self::VaccineBooker => "vaccine_booker",
        }
    }

    /// Get a description of this role
    pub fn description(&self) -> &'static str {
        match self {
            Self::DiseaseIntelligence => "Endemic and outbreak-prone diseases for a country or city",
            Self::VaccineLocator => "Vaccines for the detected diseases and where to get them",
            Self::VaccineBooker => "Books a day and time for vaccination",
        }
    }

    /// Built-in instructions sent as the system prompt
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::DiseaseIntelligence => {
                "Your responsibility is to provide information about endemic and outbreak-prone \
                 diseases in the country and city the user is travelling to. Make sure the \
                 information is accurate and up to date."
            }
            Self::VaccineLocator => {
                "Your responsibility is to provide information about vaccines available for the \
                 diseases detected by the disease_intelligent agent, and where the traveller can \
                 get each vaccine."
            }
            Self::VaccineBooker => {
                "Your responsibility is to help the user book a day and time when they can get \
                 their vaccines from vaccine clinics."
            }
        }
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disease_intelligent" | "disease_intelligence" | "disease" => Ok(Self::DiseaseIntelligence),
            "vaccine_locator" | "locator" => Ok(Self::VaccineLocator),
            "vaccine_booker" | "booker" => Ok(Self::VaccineBooker),
            _ => Err(format!("Unknown agent: {}", s)),
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
