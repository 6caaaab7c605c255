//! One request, one round trip across the boundary

use crate::guest::GuestExports;
use crate::wire::{decode_response, encode_request};
use anyhow::{Context, Result};
use http::{Request, Response};

/// Drives the Alloc/Handle/Free protocol against a guest.
#[derive(Debug)]
pub struct HostAdapter<G: GuestExports> {
    guest: G,
}

impl<G: GuestExports> HostAdapter<G> {
    pub fn new(guest: G) -> Self {
        Self { guest }
    }

    pub fn guest(&self) -> &G {
        &self.guest
    }

    pub fn guest_mut(&mut self) -> &mut G {
        &mut self.guest
    }

    pub fn into_inner(self) -> G {
        self.guest
    }

    /// Serve `request` through the guest.
    pub fn forward(&mut self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let raw = self.forward_bytes(&encode_request(request))?;
        Ok(decode_response(&raw))
    }

    /// Same as [`HostAdapter::forward`] on already-encoded bytes; returns
    /// the guest's response bytes untouched.
    ///
    /// Both buffers are freed before returning, also when a step fails
    /// after they were allocated.
    pub fn forward_bytes(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let request_address = self
            .guest
            .alloc(request.len())
            .context("Failed to allocate request buffer")?;

        let handled = self
            .guest
            .write_memory(request_address, request)
            .context("Failed to write request into guest memory")
            .and_then(|_| {
                self.guest
                    .handle(request_address, request.len())
                    .context("Guest Handle call failed")
            });

        if let Err(e) = self.guest.free(request_address, request.len()) {
            log::warn!("failed to free request buffer at {:#x}: {}", request_address, e);
        }
        let region = handled?;

        let response = self
            .guest
            .read_memory(region.address, region.length)
            .context("Failed to read response from guest memory");
        self.guest
            .free(region.address, region.length)
            .context("Failed to free response buffer")?;

        log::debug!(
            "forwarded {} request bytes, got {} response bytes",
            request.len(),
            region.length
        );
        response
    }
}
