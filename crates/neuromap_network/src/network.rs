//! The biological network graph.

use crate::connector::Connector;
use crate::dynamics::StpDescriptor;
use crate::error::NetworkError;
use crate::manual::ManualPlacement;
use crate::population::{CellType, Population};
use crate::projection::Projection;
use neuromap_common::{BioNeuronId, PopulationId, ProjectionId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

/// Populations, projections and manual placement directives of one network.
///
/// Populations and projections are append-only: their ids are dense indices
/// assigned in insertion order. The population graph (one node per
/// population, one edge per projection) is kept in sync on every insert.
#[derive(Debug, Clone, Default)]
pub struct Network {
    populations: Vec<Population>,
    projections: Vec<Projection>,
    labels: HashMap<String, PopulationId>,
    graph: DiGraph<PopulationId, ProjectionId>,
    nodes: Vec<NodeIndex>,
    /// Manual placement directives.
    pub placement: ManualPlacement,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a population and returns its id.
    pub fn add_population(
        &mut self,
        label: impl Into<String>,
        size: u32,
        cell_type: CellType,
    ) -> Result<PopulationId, NetworkError> {
        let label = label.into();
        if size == 0 {
            return Err(NetworkError::EmptyPopulation { label });
        }
        if self.labels.contains_key(&label) {
            return Err(NetworkError::DuplicateLabel(label));
        }
        let id = PopulationId::from_raw(self.populations.len() as u32);
        self.labels.insert(label.clone(), id);
        self.nodes.push(self.graph.add_node(id));
        self.populations.push(Population {
            id,
            label,
            size,
            cell_type,
            record_voltage: false,
        });
        Ok(id)
    }

    /// Marks every neuron of a population for analog voltage recording.
    pub fn record_voltage(&mut self, population: PopulationId) -> Result<(), NetworkError> {
        let pop = self
            .populations
            .get_mut(population.index())
            .ok_or_else(|| NetworkError::UnknownPopulation(population.to_string()))?;
        pop.record_voltage = true;
        Ok(())
    }

    /// Adds a projection and returns its id.
    ///
    /// Rejects projections into external inputs, connectors that do not fit
    /// the endpoint sizes, and dynamics that need both depression and
    /// facilitation.
    pub fn add_projection(
        &mut self,
        source: PopulationId,
        target: PopulationId,
        connector: Connector,
        weight: f64,
        dynamics: Option<StpDescriptor>,
    ) -> Result<ProjectionId, NetworkError> {
        let id = ProjectionId::from_raw(self.projections.len() as u32);
        let src = self.require(source)?;
        let tgt = self.require(target)?;
        let invalid = |reason: String| NetworkError::InvalidProjection {
            projection: id,
            source_label: src.label.clone(),
            target_label: tgt.label.clone(),
            reason,
        };

        if tgt.is_external() {
            return Err(invalid("target is an external input population".into()));
        }
        connector.validate(src.size, tgt.size).map_err(&invalid)?;

        let projection = Projection {
            id,
            source,
            target,
            connector,
            weight,
            dynamics,
        };
        if projection.stp_mode().is_none() {
            return Err(invalid(
                "dynamics combine depression and facilitation".into(),
            ));
        }

        self.graph
            .add_edge(self.nodes[source.index()], self.nodes[target.index()], id);
        self.projections.push(projection);
        Ok(id)
    }

    fn require(&self, id: PopulationId) -> Result<&Population, NetworkError> {
        self.population(id)
            .ok_or_else(|| NetworkError::UnknownPopulation(id.to_string()))
    }

    /// Returns a population by id.
    pub fn population(&self, id: PopulationId) -> Option<&Population> {
        self.populations.get(id.index())
    }

    /// Returns a population by label.
    pub fn population_by_label(&self, label: &str) -> Option<&Population> {
        self.labels.get(label).and_then(|&id| self.population(id))
    }

    /// All populations in id order.
    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    /// Returns a projection by id.
    pub fn projection(&self, id: ProjectionId) -> Option<&Projection> {
        self.projections.get(id.index())
    }

    /// All projections in id order.
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// Returns `true` if any projection leaves the population.
    pub fn is_source(&self, population: PopulationId) -> bool {
        self.nodes.get(population.index()).is_some_and(|&n| {
            self.graph
                .neighbors_directed(n, Direction::Outgoing)
                .next()
                .is_some()
        })
    }

    /// The distinct target populations of a population, in id order.
    pub fn targets_of(&self, population: PopulationId) -> Vec<PopulationId> {
        let Some(&node) = self.nodes.get(population.index()) else {
            return Vec::new();
        };
        let targets: BTreeSet<PopulationId> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        targets.into_iter().collect()
    }

    /// Projections ending in the population.
    pub fn incoming(&self, population: PopulationId) -> impl Iterator<Item = &Projection> {
        self.projections
            .iter()
            .filter(move |p| p.target == population)
    }

    /// Total number of biological neurons.
    pub fn neuron_count(&self) -> u64 {
        self.populations.iter().map(|p| u64::from(p.size)).sum()
    }

    /// Read access to the population graph.
    pub fn graph(&self) -> &DiGraph<PopulationId, ProjectionId> {
        &self.graph
    }

    /// Checks every manual directive against the populations of this network.
    pub fn validate_placement(&self) -> Result<(), NetworkError> {
        for pop in self.placement.populations() {
            self.require(pop)?;
        }
        for (neuron, _) in self.placement.neuron_pins() {
            let pop = self.require(neuron.population)?;
            if neuron.index >= pop.size {
                return Err(NetworkError::NeuronOutOfRange {
                    neuron,
                    size: pop.size,
                });
            }
        }
        for pop in &self.populations {
            if pop.is_external() && self.placement.denmems_for(pop.id).is_some() {
                return Err(NetworkError::InvalidDirective {
                    population: pop.id,
                    reason: "external inputs occupy no denmems".into(),
                });
            }
            if let Some(size) = self.placement.neuron_size(pop.id) {
                if size == 0 || size % 2 != 0 {
                    return Err(NetworkError::InvalidDirective {
                        population: pop.id,
                        reason: format!("neuron size {size} must be even and non-zero"),
                    });
                }
            }
            if self
                .placement
                .chips_for(pop.id)
                .is_some_and(|chips| chips.is_empty())
            {
                return Err(NetworkError::InvalidDirective {
                    population: pop.id,
                    reason: "empty chip list".into(),
                });
            }
        }
        Ok(())
    }

    /// Iterates over every neuron of every population.
    pub fn neurons(&self) -> impl Iterator<Item = BioNeuronId> + '_ {
        self.populations.iter().flat_map(Population::neurons)
    }
}
