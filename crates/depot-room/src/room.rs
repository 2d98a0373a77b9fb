//! One room: its transport queue, its lab controller and its carriers.

use crate::memory::{MemoryHeader, RoomMemory};
use crate::monitor;
use depot_core::config::Settings;
use depot_core::id::{AgentId, RoomName};
use depot_core::registry::Registry;
use depot_core::world::WorldView;
use depot_lab::{BoostTaskId, LabController, LabError};
use depot_transport::carrier::{CarrierMemory, CarrierStatus, run_carrier};
use depot_transport::queue::TransportQueue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} is not visible")]
    NotVisible(RoomName),
    #[error(transparent)]
    Lab(#[from] LabError),
}

/// What happened in one room during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomReport {
    pub tick: u64,
    pub working: usize,
    pub idle: usize,
    pub retiring: usize,
    /// Carriers that finished emptying out and were forgotten.
    pub retired: Vec<AgentId>,
    /// Carriers that vanished from the world and were forgotten.
    pub lost: Vec<AgentId>,
    pub pending_jobs: usize,
}

#[derive(Debug, Clone)]
pub struct Room {
    name: RoomName,
    queue: TransportQueue,
    lab: LabController,
    carriers: BTreeMap<AgentId, CarrierMemory>,
}

impl Room {
    pub fn new(name: RoomName, settings: &Settings, registry: &Registry) -> Result<Self, RoomError> {
        let lab = LabController::new(name.clone(), &settings.lab, registry)?;
        Ok(Self {
            name,
            queue: TransportQueue::new(),
            lab,
            carriers: BTreeMap::new(),
        })
    }

    pub fn from_memory(
        memory: RoomMemory,
        settings: &Settings,
        registry: &Registry,
    ) -> Result<Self, RoomError> {
        let RoomMemory {
            room,
            lab,
            queue,
            carriers,
            ..
        } = memory;
        let lab = LabController::restore(room.clone(), lab, &settings.lab, registry)?;
        Ok(Self {
            name: room,
            queue,
            lab,
            carriers,
        })
    }

    pub fn to_memory(&self, tick: u64) -> RoomMemory {
        RoomMemory {
            header: MemoryHeader::new(tick),
            room: self.name.clone(),
            lab: self.lab.memory().clone(),
            queue: self.queue.clone(),
            carriers: self.carriers.clone(),
        }
    }

    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub fn queue(&self) -> &TransportQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut TransportQueue {
        &mut self.queue
    }

    pub fn lab(&self) -> &LabController {
        &self.lab
    }

    pub fn lab_mut(&mut self) -> &mut LabController {
        &mut self.lab
    }

    // -----------------------------------------------------------------------
    // Carriers
    // -----------------------------------------------------------------------

    /// Put a carrier to work in this room.
    pub fn add_carrier(&mut self, agent: AgentId, memory: CarrierMemory) {
        self.carriers.insert(agent, memory);
    }

    pub fn remove_carrier(&mut self, agent: AgentId) -> Option<CarrierMemory> {
        self.queue.release(agent);
        self.carriers.remove(&agent)
    }

    pub fn carrier(&self, agent: AgentId) -> Option<&CarrierMemory> {
        self.carriers.get(&agent)
    }

    pub fn carrier_count(&self) -> usize {
        self.carriers.len()
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run the monitor, the lab controller and every carrier once.
    pub fn step(&mut self, world: &mut dyn WorldView, settings: &Settings) -> Result<RoomReport, RoomError> {
        if !world.has_room(&self.name) {
            return Err(RoomError::NotVisible(self.name.clone()));
        }
        let tick = world.tick();
        let interval = settings.transport.monitor_interval;
        if interval <= 1 || tick % interval == 0 {
            monitor::scan(&*world, &self.name, &mut self.queue, &settings.transport);
        }

        self.lab.run(world, &mut self.queue, settings);

        let mut report = RoomReport {
            tick,
            ..RoomReport::default()
        };
        for (agent, memory) in self.carriers.iter_mut() {
            match run_carrier(*agent, memory, world, &mut self.queue, &settings.transport) {
                Ok(CarrierStatus::Working(_)) => report.working += 1,
                Ok(CarrierStatus::Idle) => report.idle += 1,
                Ok(CarrierStatus::Retiring) => report.retiring += 1,
                Ok(CarrierStatus::Retired) => report.retired.push(*agent),
                Err(e) => {
                    warn!(room = %self.name, agent = ?agent, error = %e, "carrier dropped");
                    report.lost.push(*agent);
                }
            }
        }
        for agent in report.retired.iter().chain(&report.lost) {
            self.queue.release(*agent);
            self.carriers.remove(agent);
        }
        report.pending_jobs = self.queue.len();
        debug!(
            room = %self.name,
            tick,
            working = report.working,
            idle = report.idle,
            jobs = report.pending_jobs,
            "room step"
        );
        Ok(report)
    }

    /// Forward a boost request to the lab controller.
    pub fn boost_agent(
        &mut self,
        world: &mut dyn WorldView,
        agent: AgentId,
        task: BoostTaskId,
        settings: &Settings,
    ) -> bool {
        self.lab.boost_agent(world, &mut self.queue, agent, task, settings)
    }

    pub fn remove_boost_task(&mut self, world: &dyn WorldView, task: BoostTaskId) -> Result<(), RoomError> {
        Ok(self.lab.remove_boost_task(world, &mut self.queue, task)?)
    }
}
