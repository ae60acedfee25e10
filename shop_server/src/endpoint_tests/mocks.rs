use mockall::mock;
use order_engine::{PaymentProvider, ProviderError, ProviderPaymentRequest, ProviderPaymentResponse, VerifiedCallback};
use wallet_gateway::IpnNotification;

mock! {
    pub Provider {}
    impl PaymentProvider for Provider {
        type Notification = IpnNotification;
        async fn request_payment(&self, request: ProviderPaymentRequest) -> Result<ProviderPaymentResponse, ProviderError>;
        fn verify_notification(&self, notification: &IpnNotification) -> Result<VerifiedCallback, ProviderError>;
    }
}
