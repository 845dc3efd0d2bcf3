//! # Pool de Workers
//! src/workers/pool.rs
//!
//! Conjunto fijo de threads que consumen una cola FIFO compartida.
//!
//! ## Sincronización
//!
//! ```text
//! enqueue() ──push──► Mutex<PoolState> ──pop──► worker 0..N
//!              └── notify_one ──► Condvar ◄── wait_while(vacía && !stop)
//! ```
//!
//! La cola es la única estructura con exclusión mutua. Las tareas se
//! ejecutan fuera del lock.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{event, Level};

/// Número de workers por defecto
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Unidad de trabajo diferida
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Errores del pool
#[derive(Debug, Error)]
pub enum PoolError {
    /// Se intentó encolar después de iniciar el shutdown
    #[error("enqueue on stopped worker pool")]
    PoolStopped,

    /// La tarea hizo panic; el worker sigue vivo
    #[error("task panicked")]
    TaskPanicked,

    #[error("worker pool size must be >= 1")]
    InvalidSize,

    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),
}

/// Tarea encolada junto con el canal para avisar que terminó
struct QueuedTask {
    task: Task,
    done: Sender<bool>,
}

/// Estado protegido por el mutex
struct PoolState {
    tasks: VecDeque<QueuedTask>,
    stop: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    condvar: Condvar,
}

impl Shared {
    /// Ninguna tarea corre con el lock tomado, así que un lock envenenado
    /// sigue siendo consistente
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Token de finalización de una tarea encolada
///
/// Descartarlo no cancela la tarea.
#[derive(Debug)]
pub struct TaskHandle {
    done: Receiver<bool>,
}

impl TaskHandle {
    /// Bloquea hasta que la tarea termine
    ///
    /// # Errores
    ///
    /// `PoolError::TaskPanicked` si la tarea hizo panic.
    pub fn wait(self) -> Result<(), PoolError> {
        match self.done.recv() {
            Ok(true) => Ok(()),
            _ => Err(PoolError::TaskPanicked),
        }
    }
}

/// Pool de tamaño fijo con cola FIFO
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl WorkerPool {
    /// Crea el pool e inicia `size` workers
    ///
    /// # Ejemplo
    /// ```
    /// use telar::workers::WorkerPool;
    ///
    /// let pool = WorkerPool::new(2).unwrap();
    /// let handle = pool.enqueue(|| println!("hola desde un worker")).unwrap();
    /// handle.wait().unwrap();
    /// ```
    pub fn new(size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::InvalidSize);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                stop: false,
            }),
            condvar: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
            size,
        };

        for i in 0..size {
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(format!("telar-worker-{}", i))
                .spawn(move || Self::worker_loop(i, shared));

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    // Detener los que sí arrancaron antes de fallar
                    pool.shutdown();
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        event!(Level::DEBUG, size, "worker pool started");
        Ok(pool)
    }

    /// Loop principal del worker
    fn worker_loop(id: usize, shared: Arc<Shared>) {
        event!(Level::TRACE, worker = id, "worker started");

        loop {
            let queued = {
                let guard = shared.lock();
                let mut state = shared
                    .condvar
                    .wait_while(guard, |state| state.tasks.is_empty() && !state.stop)
                    .unwrap_or_else(PoisonError::into_inner);

                match state.tasks.pop_front() {
                    Some(queued) => queued,
                    // stop && cola vacía
                    None => break,
                }
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(queued.task));
            if outcome.is_err() {
                event!(Level::ERROR, worker = id, "task panicked");
            }

            // El handle pudo haberse descartado
            let _ = queued.done.send(outcome.is_ok());
        }

        event!(Level::TRACE, worker = id, "worker stopped");
    }

    /// Encola una tarea y despierta a un worker
    ///
    /// # Errores
    ///
    /// `PoolError::PoolStopped` si ya se llamó a `shutdown`.
    pub fn enqueue<F>(&self, task: F) -> Result<TaskHandle, PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let (done, receiver) = mpsc::channel();

        {
            let mut state = self.shared.lock();
            if state.stop {
                return Err(PoolError::PoolStopped);
            }
            state.tasks.push_back(QueuedTask {
                task: Box::new(task),
                done,
            });
        }

        self.shared.condvar.notify_one();
        Ok(TaskHandle { done: receiver })
    }

    /// Detiene el pool: drena la cola y espera a todos los workers
    ///
    /// Las tareas ya encoladas se ejecutan. Llamarlo más de una vez no
    /// tiene efecto.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.lock();
            state.stop = true;
        }
        self.shared.condvar.notify_all();

        if self.workers.is_empty() {
            return;
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                event!(Level::ERROR, "worker thread exited abnormally");
            }
        }

        event!(Level::DEBUG, "worker pool stopped");
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tareas esperando en la cola
    pub fn queued(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stop
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
