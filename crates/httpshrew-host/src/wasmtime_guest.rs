//! A guest compiled to WebAssembly and run under wasmtime
//!
//! Guests built for `wasm32-wasip1` get a preview1 WASI context with the
//! host's stdio and an explicit, by default empty, environment. Imports
//! outside WASI trap when called.

use crate::guest::GuestExports;
use anyhow::{anyhow, Context, Result};
use httpshrew_support::compat::Region;
use std::path::Path;
use wasmtime::{Engine, Instance, Linker, Memory, Module, Store, TypedFunc};
use wasmtime_wasi::sync::WasiCtxBuilder;
use wasmtime_wasi::WasiCtx;

pub struct WasmtimeGuest {
    store: Store<WasiCtx>,
    memory: Memory,
    alloc: TypedFunc<u32, u32>,
    free: TypedFunc<(u32, u32), ()>,
    handle: TypedFunc<(u32, u32), u64>,
}

impl WasmtimeGuest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::from_file(&engine, path.as_ref())
            .with_context(|| format!("Failed to load WASM module {}", path.as_ref().display()))?;
        Self::instantiate(&engine, &module, &[])
    }

    /// Load a module from binary or text format.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, bytes).context("Failed to compile WASM module")?;
        Self::instantiate(&engine, &module, &[])
    }

    /// Instantiate `module` with `env` as its WASI environment, run
    /// `_initialize` if it exports one and look up the boundary exports.
    ///
    /// The guest reads its `HTTPSHREW_*` settings from `env` when its bridge
    /// is first touched.
    pub fn instantiate(engine: &Engine, module: &Module, env: &[(&str, &str)]) -> Result<Self> {
        let mut builder = WasiCtxBuilder::new();
        builder.inherit_stdio();
        for (key, value) in env {
            builder
                .env(key, value)
                .with_context(|| format!("Failed to set guest environment variable {}", key))?;
        }
        let mut store = Store::new(engine, builder.build());

        let mut linker = Linker::<WasiCtx>::new(engine);
        wasmtime_wasi::add_to_linker(&mut linker, |cx| cx)
            .context("Failed to link WASI preview1")?;
        linker.define_unknown_imports_as_traps(module)?;
        let instance = linker
            .instantiate(&mut store, module)
            .context("Failed to instantiate WASM module")?;

        if let Some(initialize) = instance.get_func(&mut store, "_initialize") {
            initialize
                .typed::<(), ()>(&store)
                .context("_initialize has an unexpected signature")?
                .call(&mut store, ())
                .context("Error executing _initialize")?;
            log::debug!("guest _initialize completed");
        }

        Self::bind(store, instance)
    }

    fn bind(mut store: Store<WasiCtx>, instance: Instance) -> Result<Self> {
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| anyhow!("guest does not export memory"))?;
        let alloc = instance
            .get_typed_func::<u32, u32>(&mut store, "Alloc")
            .context("Failed to get Alloc export")?;
        let free = instance
            .get_typed_func::<(u32, u32), ()>(&mut store, "Free")
            .context("Failed to get Free export")?;
        let handle = instance
            .get_typed_func::<(u32, u32), u64>(&mut store, "Handle")
            .context("Failed to get Handle export")?;
        Ok(Self {
            store,
            memory,
            alloc,
            free,
            handle,
        })
    }

    /// Current size of the guest's linear memory in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }
}

fn offset(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{:#x} does not fit a 32-bit guest offset", value))
}

impl GuestExports for WasmtimeGuest {
    fn alloc(&mut self, size: usize) -> Result<usize> {
        let address = self
            .alloc
            .call(&mut self.store, offset(size)?)
            .context("Error executing Alloc")?;
        Ok(address as usize)
    }

    fn free(&mut self, address: usize, size: usize) -> Result<()> {
        self.free
            .call(&mut self.store, (offset(address)?, offset(size)?))
            .context("Error executing Free")
    }

    fn handle(&mut self, address: usize, length: usize) -> Result<Region> {
        let word = self
            .handle
            .call(&mut self.store, (offset(address)?, offset(length)?))
            .context("Error executing Handle")?;
        Ok(Region::unpack(word))
    }

    fn write_memory(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        self.memory
            .write(&mut self.store, address, bytes)
            .with_context(|| format!("Failed to write {} bytes at {:#x}", bytes.len(), address))
    }

    fn read_memory(&mut self, address: usize, length: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        self.memory
            .read(&self.store, address, &mut buffer)
            .with_context(|| format!("Failed to read {} bytes at {:#x}", length, address))?;
        Ok(buffer)
    }
}

impl std::fmt::Debug for WasmtimeGuest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmtimeGuest")
            .field("memory_size", &self.memory_size())
            .finish()
    }
}
