//! Ticket lifecycle manager.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    clock::{Clock, SystemClock},
    cuit::Cuit,
    login::LoginExchange,
    manager::{TicketManagerError, TicketState},
    request::{LoginTicketRequest, WSFE},
    signer::{Identity, Signer},
    store::TicketStore,
    ticket::{AccessTicket, AuthorizationPayload},
};

/// Hands out valid access tickets, refreshing them through the issuer when
/// the stored one is missing or expired.
///
/// Refreshes are serialized per tenant: concurrent callers for the same CUIT
/// wait for the in-flight refresh and then reuse the ticket it stored.
pub struct TicketManager {
    identity: Identity,
    service: String,
    store: Arc<dyn TicketStore>,
    signer: Arc<dyn Signer>,
    login: Arc<dyn LoginExchange>,
    clock: Arc<dyn Clock>,
    tenant_locks: Mutex<FxHashMap<Cuit, Arc<Mutex<()>>>>,
}

impl TicketManager {
    /// Manager for the `wsfe` service using the system clock.
    #[must_use]
    pub fn new(
        identity: Identity,
        store: Arc<dyn TicketStore>,
        signer: Arc<dyn Signer>,
        login: Arc<dyn LoginExchange>,
    ) -> Self {
        Self {
            identity,
            service: WSFE.to_string(),
            store,
            signer,
            login,
            clock: Arc::new(SystemClock),
            tenant_locks: Mutex::default(),
        }
    }

    /// Request tickets for `service` instead of `wsfe`.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Use `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Service tickets are requested and stored for.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Return a ticket for `cuit` that is valid right now.
    ///
    /// A stored ticket inside its window is returned as is, without contacting
    /// the issuer. Otherwise a new ticket is requested, stored and returned.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored record cannot be read, or when any
    /// step of the refresh fails. A stale ticket is never returned in place of
    /// a failed refresh.
    #[instrument(skip(self), fields(%cuit, service = %self.service))]
    pub async fn get_valid_ticket(&self, cuit: Cuit) -> Result<AccessTicket, TicketManagerError> {
        let tenant_lock = self.tenant_lock(cuit).await;

        let result = {
            let _refresh_guard = tenant_lock.lock().await;

            self.load_or_refresh(cuit).await
        };

        self.release_tenant_lock(cuit, &tenant_lock).await;

        result
    }

    /// Authorization payload for `cuit` built from a valid ticket.
    ///
    /// # Errors
    ///
    /// Returns an error when no valid ticket can be obtained.
    pub async fn authorization(
        &self,
        cuit: Cuit,
    ) -> Result<AuthorizationPayload, TicketManagerError> {
        self.get_valid_ticket(cuit)
            .await
            .map(|ticket| ticket.to_authorization_payload(cuit))
    }

    async fn load_or_refresh(&self, cuit: Cuit) -> Result<AccessTicket, TicketManagerError> {
        let stored = self
            .store
            .load(cuit, &self.service)
            .await
            .map_err(TicketManagerError::Store)?;

        let now = self.clock.now();
        let state = TicketState::of(stored.as_ref(), now);

        if let Some(ticket) = stored
            && state == TicketState::CredentialValid
        {
            debug!(%state, expires_at = %ticket.expiration_time(), "reusing stored ticket");

            return Ok(ticket);
        }

        info!(%state, "requesting new access ticket");

        match self.refresh(cuit, now).await {
            Ok(ticket) => {
                info!(
                    state = %TicketState::CredentialValid,
                    expires_at = %ticket.expiration_time(),
                    "access ticket refreshed"
                );

                Ok(ticket)
            }
            Err(error) => {
                warn!(state = %TicketState::RefreshFailed, "access ticket refresh failed: {error}");

                Err(error)
            }
        }
    }

    async fn refresh(&self, cuit: Cuit, now: Timestamp) -> Result<AccessTicket, TicketManagerError> {
        debug!(state = %TicketState::Refreshing, "signing ticket request");

        let request = LoginTicketRequest::build(&self.service, now);
        let signed = self.signer.sign(&request.to_xml(), &self.identity).await?;
        let ticket = AccessTicket::from(self.login.login(&signed).await?);

        if ticket.is_expired(self.clock.now()) {
            return Err(TicketManagerError::IssuedExpired {
                expiration_time: ticket.expiration_time(),
            });
        }

        if let Err(source) = self.store.save(cuit, &self.service, &ticket).await {
            return Err(TicketManagerError::Persist {
                ticket: Box::new(ticket),
                source,
            });
        }

        Ok(ticket)
    }

    async fn tenant_lock(&self, cuit: Cuit) -> Arc<Mutex<()>> {
        self.tenant_locks
            .lock()
            .await
            .entry(cuit)
            .or_default()
            .clone()
    }

    /// Drop the lock entry for `cuit` once no other caller holds or awaits it.
    async fn release_tenant_lock(&self, cuit: Cuit, tenant_lock: &Arc<Mutex<()>>) {
        let mut locks = self.tenant_locks.lock().await;

        // One reference in the map, one here.
        if Arc::strong_count(tenant_lock) == 2 {
            locks.remove(&cuit);
        }
    }
}

impl fmt::Debug for TicketManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketManager")
            .field("identity", &self.identity)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, ErrorKind},
        path::PathBuf,
    };

    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::{
        clock::MockClock,
        login::{LoginError, MockLoginExchange},
        signer::{MockSigner, SignedRequest, SignerError},
        store::{MockTicketStore, StoreError},
        ticket::{LoginResponse, TicketCredentials, TicketHeader},
    };

    use super::*;

    fn cuit() -> Cuit {
        Cuit::new(20_111_111_112).expect("valid CUIT")
    }

    fn now() -> Timestamp {
        "2026-10-19T12:00:00Z".parse().expect("valid timestamp")
    }

    fn identity() -> Identity {
        Identity {
            certificate: PathBuf::from("cert.pem"),
            private_key: PathBuf::from("key.pem"),
        }
    }

    fn header(expiration_time: Timestamp) -> TicketHeader {
        TicketHeader {
            source: "CN=wsaahomo, O=AFIP, C=AR".to_string(),
            destination: "SERIALNUMBER=CUIT 20111111112, CN=test".to_string(),
            unique_id: "383953094".to_string(),
            generation_time: expiration_time - SignedDuration::from_hours(12),
            expiration_time,
        }
    }

    fn login_response(token: &str, sign: &str, expiration_time: Timestamp) -> LoginResponse {
        LoginResponse {
            header: header(expiration_time),
            credentials: TicketCredentials {
                token: token.to_string(),
                sign: sign.to_string(),
            },
        }
    }

    fn stored_ticket(expiration_time: Timestamp) -> AccessTicket {
        login_response("stored-token", "stored-sign", expiration_time).into()
    }

    fn fixed_clock() -> MockClock {
        let mut clock = MockClock::new();

        clock.expect_now().return_const(now());

        clock
    }

    fn manager(store: MockTicketStore, signer: MockSigner, login: MockLoginExchange) -> TicketManager {
        TicketManager::new(identity(), Arc::new(store), Arc::new(signer), Arc::new(login))
            .with_clock(Arc::new(fixed_clock()))
    }

    fn signer_once() -> MockSigner {
        let mut signer = MockSigner::new();

        signer
            .expect_sign()
            .once()
            .withf(|_document, identity| *identity == self::identity())
            .return_once(|_, _| Ok(SignedRequest::new("c2lnbmVk".to_string())));

        signer
    }

    fn login_once(response: LoginResponse) -> MockLoginExchange {
        let mut login = MockLoginExchange::new();

        login
            .expect_login()
            .once()
            .withf(|request| request.as_str() == "c2lnbmVk")
            .return_once(move |_| Ok(response));

        login
    }

    fn strict_signer() -> MockSigner {
        let mut signer = MockSigner::new();

        signer.expect_sign().never();

        signer
    }

    fn strict_login() -> MockLoginExchange {
        let mut login = MockLoginExchange::new();

        login.expect_login().never();

        login
    }

    #[tokio::test]
    async fn missing_record_triggers_one_refresh() -> TestResult {
        let expiration = now() + SignedDuration::from_secs(3600);

        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store
            .expect_save()
            .once()
            .withf(|cuit, service, ticket| {
                *cuit == self::cuit() && service == WSFE && ticket.token() == "T1"
            })
            .return_once(|_, _, _| Ok(()));

        let mut signer = MockSigner::new();

        signer
            .expect_sign()
            .once()
            .withf(|document, _identity| {
                document.contains("<uniqueId>1792411200</uniqueId>")
                    && document.contains("<generationTime>2026-10-19T11:50:00Z</generationTime>")
                    && document.contains("<expirationTime>2026-10-19T12:10:00Z</expirationTime>")
                    && document.contains("<service>wsfe</service>")
            })
            .return_once(|_, _| Ok(SignedRequest::new("c2lnbmVk".to_string())));

        let manager = manager(store, signer, login_once(login_response("T1", "S1", expiration)));

        let ticket = manager.get_valid_ticket(cuit()).await?;

        assert!(!ticket.is_expired(now()));
        assert_eq!(
            ticket.to_authorization_payload(cuit()),
            AuthorizationPayload {
                token: "T1".to_string(),
                sign: "S1".to_string(),
                cuit: cuit(),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn valid_stored_ticket_is_returned_without_remote_calls() -> TestResult {
        let stored = stored_ticket(now() + SignedDuration::from_secs(1));
        let returned = stored.clone();

        let mut store = MockTicketStore::new();

        store
            .expect_load()
            .once()
            .return_once(move |_, _| Ok(Some(returned)));
        store.expect_save().never();

        let manager = manager(store, strict_signer(), strict_login());

        let ticket = manager.get_valid_ticket(cuit()).await?;

        assert_eq!(ticket, stored);

        Ok(())
    }

    #[tokio::test]
    async fn expired_stored_ticket_is_replaced() -> TestResult {
        let stale = stored_ticket(now() - SignedDuration::from_secs(1));
        let stale_expiration = stale.expiration_time();

        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(move |_, _| Ok(Some(stale)));
        store.expect_save().once().return_once(|_, _, _| Ok(()));

        let fresh_expiration = now() + SignedDuration::from_hours(12);
        let manager = manager(
            store,
            signer_once(),
            login_once(login_response("T2", "S2", fresh_expiration)),
        );

        let ticket = manager.get_valid_ticket(cuit()).await?;

        assert_eq!(ticket.token(), "T2");
        assert!(ticket.expiration_time() > stale_expiration);

        Ok(())
    }

    #[tokio::test]
    async fn ticket_expiring_exactly_now_is_replaced() -> TestResult {
        let boundary = stored_ticket(now());

        let mut store = MockTicketStore::new();

        store
            .expect_load()
            .once()
            .return_once(move |_, _| Ok(Some(boundary)));
        store.expect_save().once().return_once(|_, _, _| Ok(()));

        let manager = manager(
            store,
            signer_once(),
            login_once(login_response("T2", "S2", now() + SignedDuration::from_hours(12))),
        );

        assert_eq!(manager.get_valid_ticket(cuit()).await?.token(), "T2");

        Ok(())
    }

    #[tokio::test]
    async fn unreadable_store_is_propagated() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| {
            Err(StoreError::Unreadable {
                path: PathBuf::from("credentials/TA-20111111112-wsfe.json"),
                source: io::Error::from(ErrorKind::PermissionDenied),
            })
        });
        store.expect_save().never();

        let manager = manager(store, strict_signer(), strict_login());

        let result = manager.get_valid_ticket(cuit()).await;

        assert!(
            matches!(
                result,
                Err(TicketManagerError::Store(StoreError::Unreadable { .. }))
            ),
            "expected Unreadable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn malformed_record_is_propagated() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| {
            Err(StoreError::Malformed {
                path: PathBuf::from("credentials/TA-20111111112-wsfe.json"),
                source: serde_json::from_str::<AccessTicket>("[]")
                    .expect_err("array is not a ticket"),
            })
        });
        store.expect_save().never();

        let manager = manager(store, strict_signer(), strict_login());

        let result = manager.get_valid_ticket(cuit()).await;

        assert!(
            matches!(
                result,
                Err(TicketManagerError::Store(StoreError::Malformed { .. }))
            ),
            "expected Malformed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_is_propagated_and_nothing_is_stored() -> TestResult {
        let stale = stored_ticket(now() - SignedDuration::from_secs(1));

        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(move |_, _| Ok(Some(stale)));
        store.expect_save().never();

        let mut login = MockLoginExchange::new();

        login.expect_login().once().return_once(|_| {
            Err(LoginError::AuthRejected {
                code: "ns1:cms.cert.untrusted".to_string(),
                message: "Certificado no emitido por AC de confianza".to_string(),
            })
        });

        let manager = manager(store, signer_once(), login);

        let result = manager.get_valid_ticket(cuit()).await;

        assert!(
            matches!(
                result,
                Err(TicketManagerError::Login(LoginError::AuthRejected { ref code, .. }))
                    if code == "ns1:cms.cert.untrusted"
            ),
            "expected AuthRejected, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn signing_failure_skips_login() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store.expect_save().never();

        let mut signer = MockSigner::new();

        signer
            .expect_sign()
            .once()
            .return_once(|_, _| Err(SignerError::InvalidIdentity("no such key".to_string())));

        let manager = manager(store, signer, strict_login());

        let result = manager.get_valid_ticket(cuit()).await;

        assert!(
            matches!(result, Err(TicketManagerError::Signing(_))),
            "expected Signing, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_is_propagated() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store.expect_save().never();

        let mut login = MockLoginExchange::new();

        login
            .expect_login()
            .once()
            .return_once(|_| Err(LoginError::transport(io::Error::from(ErrorKind::TimedOut))));

        let manager = manager(store, signer_once(), login);

        let result = manager.get_valid_ticket(cuit()).await;

        assert!(
            matches!(result, Err(TicketManagerError::Login(LoginError::Transport(_)))),
            "expected Transport, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn already_expired_issued_ticket_is_rejected() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store.expect_save().never();

        let manager = manager(
            store,
            signer_once(),
            login_once(login_response("T1", "S1", now() - SignedDuration::from_secs(5))),
        );

        let result = manager.get_valid_ticket(cuit()).await;

        assert!(
            matches!(result, Err(TicketManagerError::IssuedExpired { .. })),
            "expected IssuedExpired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn persist_failure_still_carries_the_fresh_ticket() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store.expect_save().once().return_once(|_, _, _| {
            Err(StoreError::Persist {
                path: PathBuf::from("credentials/TA-20111111112-wsfe.json"),
                source: io::Error::from(ErrorKind::StorageFull),
            })
        });

        let manager = manager(
            store,
            signer_once(),
            login_once(login_response("T1", "S1", now() + SignedDuration::from_hours(12))),
        );

        let error = manager
            .get_valid_ticket(cuit())
            .await
            .expect_err("persist failure must surface");

        assert!(matches!(error, TicketManagerError::Persist { .. }));
        assert_eq!(
            error.into_unpersisted_ticket().as_ref().map(AccessTicket::token),
            Some("T1")
        );

        Ok(())
    }

    #[tokio::test]
    async fn authorization_uses_the_valid_ticket() -> TestResult {
        let stored = stored_ticket(now() + SignedDuration::from_hours(1));

        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(move |_, _| Ok(Some(stored)));
        store.expect_save().never();

        let manager = manager(store, strict_signer(), strict_login());

        let payload = manager.authorization(cuit()).await?;

        assert_eq!(payload.token, "stored-token");
        assert_eq!(payload.sign, "stored-sign");
        assert_eq!(payload.cuit, cuit());

        Ok(())
    }

    #[tokio::test]
    async fn store_is_keyed_by_the_configured_service() -> TestResult {
        let mut store = MockTicketStore::new();

        store
            .expect_load()
            .once()
            .withf(|_cuit, service| service == "wsfex")
            .return_once(|_, _| Ok(None));
        store
            .expect_save()
            .once()
            .withf(|_cuit, service, _ticket| service == "wsfex")
            .return_once(|_, _, _| Ok(()));

        let mut signer = MockSigner::new();

        signer
            .expect_sign()
            .once()
            .withf(|document, _identity| document.contains("<service>wsfex</service>"))
            .return_once(|_, _| Ok(SignedRequest::new("c2lnbmVk".to_string())));

        let manager = manager(
            store,
            signer,
            login_once(login_response("T1", "S1", now() + SignedDuration::from_hours(12))),
        )
        .with_service("wsfex");

        assert_eq!(manager.get_valid_ticket(cuit()).await?.token(), "T1");

        Ok(())
    }

    #[tokio::test]
    async fn tenant_lock_is_released_after_refresh() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store.expect_save().once().return_once(|_, _, _| Ok(()));

        let manager = manager(
            store,
            signer_once(),
            login_once(login_response("T1", "S1", now() + SignedDuration::from_hours(12))),
        );

        manager.get_valid_ticket(cuit()).await?;

        assert!(
            manager.tenant_locks.lock().await.is_empty(),
            "idle tenant lock should be dropped"
        );

        Ok(())
    }

    #[tokio::test]
    async fn tenant_lock_is_released_after_failure() -> TestResult {
        let mut store = MockTicketStore::new();

        store.expect_load().once().return_once(|_, _| Ok(None));
        store.expect_save().never();

        let mut signer = MockSigner::new();

        signer
            .expect_sign()
            .once()
            .return_once(|_, _| Err(SignerError::Failed("openssl exited with 1".to_string())));

        let manager = manager(store, signer, strict_login());

        assert!(
            manager.get_valid_ticket(cuit()).await.is_err(),
            "signing failure should surface"
        );
        assert!(
            manager.tenant_locks.lock().await.is_empty(),
            "idle tenant lock should be dropped"
        );

        Ok(())
    }

    #[test]
    fn state_classification() {
        assert_eq!(TicketState::of(None, now()), TicketState::NoCredential);
        assert_eq!(
            TicketState::of(Some(&stored_ticket(now() + SignedDuration::from_secs(1))), now()),
            TicketState::CredentialValid
        );
        assert_eq!(
            TicketState::of(Some(&stored_ticket(now())), now()),
            TicketState::CredentialExpired
        );
    }
}
