//! Generic voltage-gated channel
//!
//! A channel is fully described by a [`ChannelSpec`]: a list of gates and the
//! currents built from them. Every concrete channel in `rsmech-components` is
//! a parameterisation of this one engine.

use crate::constants::{FloatValue, Time};
use crate::current::{CurrentAssembler, CurrentSpec};
use crate::errors::{MechanismError, MechanismResult};
use crate::gating::{GateSpec, GatingVariable};
use crate::mechanism::Mechanism;
use crate::node::{IonicCurrents, NodeState};
use serde::{Deserialize, Serialize};

/// Declarative description of a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    #[serde(default)]
    pub gates: Vec<GateSpec>,
    pub currents: Vec<CurrentSpec>,
    /// Instance temperature overriding the host's ambient temperature
    /// unit: degC
    #[serde(default)]
    pub temperature: Option<FloatValue>,
}

impl ChannelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gates: vec![],
            currents: vec![],
            temperature: None,
        }
    }

    pub fn with_gate(mut self, gate: GateSpec) -> Self {
        self.gates.push(gate);
        self
    }

    pub fn with_current(mut self, current: CurrentSpec) -> Self {
        self.currents.push(current);
        self
    }

    pub fn with_temperature(mut self, celsius: FloatValue) -> Self {
        self.temperature = Some(celsius);
        self
    }

    /// Validate the gates and resolve the currents against the gates
    fn assemble(&self) -> MechanismResult<Vec<CurrentAssembler>> {
        if self.name.is_empty() {
            return Err(MechanismError::invalid("", "name", "channel names must be non-empty"));
        }
        if self.currents.is_empty() {
            return Err(MechanismError::invalid(
                &self.name,
                "currents",
                "a channel needs at least one current",
            ));
        }
        if let Some(celsius) = self.temperature {
            if !celsius.is_finite() {
                return Err(MechanismError::invalid(
                    &self.name,
                    "temperature",
                    "temperature must be finite",
                ));
            }
        }

        let names: Vec<&str> = self.gates.iter().map(|gate| gate.name.as_str()).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(MechanismError::invalid(
                    &self.name,
                    name.to_string(),
                    "gate names must be unique",
                ));
            }
        }
        for gate in self.gates.iter() {
            gate.validate(&self.name)?;
        }

        self.currents
            .iter()
            .map(|current| current.assemble(&self.name, &names))
            .collect()
    }
}

/// Instance of a [`ChannelSpec`] with its gate states
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ChannelSpec", into = "ChannelSpec")]
pub struct Channel {
    spec: ChannelSpec,
    currents: Vec<CurrentAssembler>,
    gates: Vec<GatingVariable>,
    /// Temperature the cached Q10 factors were computed at
    q10_celsius: Option<FloatValue>,
    q10_factors: Vec<FloatValue>,
}

impl TryFrom<ChannelSpec> for Channel {
    type Error = MechanismError;

    fn try_from(spec: ChannelSpec) -> MechanismResult<Self> {
        Channel::new(spec)
    }
}

impl From<Channel> for ChannelSpec {
    fn from(value: Channel) -> Self {
        value.spec
    }
}

impl Channel {
    pub fn new(mut spec: ChannelSpec) -> MechanismResult<Self> {
        let currents = spec.assemble()?;
        // Specs loaded from files skip `GateSpec::new`
        for gate in spec.gates.iter_mut() {
            gate.kinetics = gate.kinetics.clone().with_precomputed_clamps();
        }
        let gates = spec
            .gates
            .iter()
            .map(|gate| GatingVariable::new(gate.name.clone()))
            .collect();
        let n_gates = spec.gates.len();
        Ok(Self {
            spec,
            currents,
            gates,
            q10_celsius: None,
            q10_factors: vec![1.0; n_gates],
        })
    }

    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }

    pub fn gates(&self) -> &[GatingVariable] {
        &self.gates
    }

    pub fn gate(&self, name: &str) -> Option<&GatingVariable> {
        self.gates.iter().find(|gate| gate.name() == name)
    }

    /// Instance temperature if set, otherwise the host's
    pub fn temperature(&self, node: &NodeState) -> FloatValue {
        self.spec.temperature.unwrap_or(node.celsius)
    }

    fn refresh_q10(&mut self, celsius: FloatValue) {
        if self.q10_celsius == Some(celsius) {
            return;
        }
        for (factor, gate) in self.q10_factors.iter_mut().zip(self.spec.gates.iter()) {
            *factor = gate.q10_factor(celsius);
        }
        log::debug!(
            "{}: Q10 factors at {} degC: {:?}",
            self.spec.name,
            celsius,
            self.q10_factors
        );
        self.q10_celsius = Some(celsius);
    }

    fn update_targets(&mut self, node: &NodeState) {
        let celsius = self.temperature(node);
        self.refresh_q10(celsius);
        for ((state, gate), factor) in self
            .gates
            .iter_mut()
            .zip(self.spec.gates.iter())
            .zip(self.q10_factors.iter())
        {
            let (steady_state, tau) = gate.evaluate(node.voltage, *factor);
            state.update_targets(steady_state, tau);
        }
    }
}

#[typetag::serde]
impl Mechanism for Channel {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn initialise(&mut self, node: &NodeState) -> MechanismResult<()> {
        self.update_targets(node);
        for gate in self.gates.iter_mut() {
            let (steady_state, tau) = (gate.steady_state(), gate.tau());
            gate.initialise(steady_state, tau);
        }
        log::debug!(
            "Initialised {} at {} mV: {:?}",
            self.spec.name,
            node.voltage,
            self.states()
        );
        Ok(())
    }

    fn currents(&self, voltage: FloatValue, node: &NodeState) -> MechanismResult<IonicCurrents> {
        let celsius = self.temperature(node);
        let mut currents = IonicCurrents::default();
        for assembler in self.currents.iter() {
            let current = assembler.current(voltage, &self.gates, node, celsius)?;
            match assembler.carrier() {
                Some(ion) => currents.add_ion(ion, current),
                None => currents.add_nonspecific(current),
            }
        }
        Ok(currents)
    }

    fn advance(&mut self, node: &NodeState, dt: Time) -> MechanismResult<()> {
        self.update_targets(node);
        for gate in self.gates.iter_mut() {
            gate.advance(dt)?;
        }
        Ok(())
    }

    fn states(&self) -> Vec<FloatValue> {
        self.gates.iter().map(|gate| gate.value()).collect()
    }

    fn set_states(&mut self, states: &[FloatValue]) -> MechanismResult<()> {
        if states.len() != self.gates.len() {
            return Err(MechanismError::StateLength {
                mechanism: self.spec.name.clone(),
                expected: self.gates.len(),
                got: states.len(),
            });
        }
        for (gate, value) in self.gates.iter_mut().zip(states.iter()) {
            gate.set_value(*value);
        }
        Ok(())
    }

    fn derivatives(&mut self, node: &NodeState) -> MechanismResult<Vec<FloatValue>> {
        self.update_targets(node);
        Ok(self.gates.iter().map(|gate| gate.derivative()).collect())
    }

    fn matsol(&mut self, node: &NodeState, dt: Time, d: &mut [FloatValue]) -> MechanismResult<()> {
        if d.len() != self.gates.len() {
            return Err(MechanismError::StateLength {
                mechanism: self.spec.name.clone(),
                expected: self.gates.len(),
                got: d.len(),
            });
        }
        self.update_targets(node);
        for (value, gate) in d.iter_mut().zip(self.gates.iter()) {
            *value = gate.matsol(*value, dt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::current::{GateFactor, ReversalSource};
    use crate::gating::GateKinetics;
    use crate::ion::Ion;
    use crate::q10::Q10Scaler;
    use crate::rates::{Clamp, RateExpression};
    use approx::assert_relative_eq;
    use is_close::is_close;

    fn potassium_channel() -> ChannelSpec {
        ChannelSpec::new("hh_k")
            .with_gate(
                GateSpec::new(
                    "n",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::exp_linear(0.01, -55.0, 10.0),
                        beta: RateExpression::exponential(0.125, 65.0, -80.0),
                    },
                )
                .with_q10(Q10Scaler::new(3.0, 6.3, 10.0)),
            )
            .with_current(
                CurrentSpec::new("ik", 0.036, Some(Ion::K), ReversalSource::Ion)
                    .with_factor(GateFactor::power("n", 4)),
            )
    }

    #[test]
    fn test_loaded_spec_gets_clamps() {
        let mut spec = potassium_channel();
        spec.gates[0].kinetics = GateKinetics::AlphaBeta {
            alpha: RateExpression::ExpLinear {
                a: 0.01,
                b: -55.0,
                c: 10.0,
                clamp: Clamp::default(),
            },
            beta: RateExpression::exponential(0.125, 65.0, -80.0),
        };
        let channel = Channel::new(spec).unwrap();

        let GateKinetics::AlphaBeta { alpha, .. } = &channel.spec().gates[0].kinetics else {
            panic!("kinetics changed form");
        };
        let RateExpression::ExpLinear { clamp, .. } = alpha else {
            panic!("rate changed family");
        };
        assert!(clamp.below.is_some() && clamp.above.is_some());
        assert_eq!(alpha.evaluate(-400.0), alpha.evaluate(-150.0));
        assert_eq!(channel.spec(), &potassium_channel());
    }

    #[test]
    fn test_initialise_to_steady_state() {
        let mut channel = Channel::new(potassium_channel()).unwrap();
        let node = NodeState::new(-65.0, 6.3);
        channel.initialise(&node).unwrap();

        let (n_inf, _) = channel.spec().gates[0].evaluate(-65.0, 1.0);
        assert_eq!(channel.states(), vec![n_inf]);
        assert!(n_inf > 0.3 && n_inf < 0.33, "n_inf = {}", n_inf);

        let currents = channel.currents(-65.0, &node).unwrap();
        assert!(is_close!(currents.by_ion[Ion::K], 0.036 * n_inf.powi(4) * 12.0));
        assert_eq!(currents.nonspecific, 0.0);
    }

    #[test]
    fn test_advance_requires_initialise() {
        let mut channel = Channel::new(potassium_channel()).unwrap();
        assert!(channel.advance(&NodeState::default(), 0.025).is_err());
    }

    #[test]
    fn test_instance_temperature_overrides_host() {
        let mut warm = Channel::new(potassium_channel().with_temperature(16.3)).unwrap();
        let mut host = Channel::new(potassium_channel()).unwrap();
        let node = NodeState::new(-65.0, 6.3);
        warm.initialise(&node).unwrap();
        host.initialise(&node).unwrap();
        assert_relative_eq!(
            warm.gates()[0].tau() * 3.0,
            host.gates()[0].tau(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_derivatives_and_set_states() {
        let mut channel = Channel::new(potassium_channel()).unwrap();
        let node = NodeState::new(-65.0, 6.3);
        channel.initialise(&node).unwrap();
        channel.set_states(&[0.0]).unwrap();

        let derivatives = channel.derivatives(&node).unwrap();
        let (steady_state, tau) = {
            let gate = &channel.gates()[0];
            (gate.steady_state(), gate.tau())
        };
        assert!(is_close!(derivatives[0], steady_state / tau));

        let mut d = vec![1.0];
        channel.matsol(&node, 0.1, &mut d).unwrap();
        assert!(is_close!(d[0], 1.0 / (1.0 + 0.1 / tau)));

        assert!(matches!(
            channel.set_states(&[0.1, 0.2]),
            Err(MechanismError::StateLength { expected: 1, got: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_spec() {
        let duplicate = potassium_channel().with_gate(potassium_channel().gates[0].clone());
        assert!(Channel::new(duplicate).is_err());

        let no_currents = ChannelSpec::new("empty");
        assert!(Channel::new(no_currents).is_err());
    }

    #[test]
    fn test_serialises_as_spec() {
        let channel = Channel::new(potassium_channel()).unwrap();
        let mechanism: Box<dyn Mechanism> = Box::new(channel);
        let serialised = serde_json::to_string(&mechanism).unwrap();
        assert!(serialised.contains("\"mechanism\":\"Channel\""));

        let restored: Box<dyn Mechanism> = serde_json::from_str(&serialised).unwrap();
        assert_eq!(restored.name(), "hh_k");

        let broken = serialised.replace("\"conductance\":0.036", "\"conductance\":-1.0");
        assert!(serde_json::from_str::<Box<dyn Mechanism>>(&broken).is_err());
    }
}
